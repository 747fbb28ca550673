use std::sync::Arc;

use serde_json::Value;

use crate::backend::BackendRegistry;
use crate::call::CallRoot;
use crate::namespace::NamespaceRegistry;
use crate::session::Session;

/// `RouterContext` 把命名空间注册表与后端槽位收拢为一个显式配置值。
///
/// # 设计背景（Why）
/// - 进程级单例注册表意味着隐式全局耦合；改为在进程启动时构造一次、以
///   `Arc` 注入每个调用根对象，既保留“配置一次、处处可用”的使用体验，又让
///   测试可以各自持有互不干扰的上下文；
/// - 两个注册表内部自带读写锁，上下文本身保持只读共享即可。
///
/// # 契约说明（What）
/// - **前置条件**：注册别名与注入后端应在进程启动期完成；运行中途的改写对
///   在途链路的可见性不做仲裁；
/// - **后置条件**：由同一上下文派生的所有根对象观察到同一份配置。
pub struct RouterContext {
    namespaces: NamespaceRegistry,
    backends: BackendRegistry,
}

impl RouterContext {
    /// 构造带出厂默认命名空间、后端槽位全空的上下文。
    pub fn new() -> Self {
        Self {
            namespaces: NamespaceRegistry::new(),
            backends: BackendRegistry::new(),
        }
    }

    /// 访问命名空间注册表。
    pub fn namespaces(&self) -> &NamespaceRegistry {
        &self.namespaces
    }

    /// 访问后端槽位注册表。
    pub fn backends(&self) -> &BackendRegistry {
        &self.backends
    }

    /// 为指定会话派生一个调用根对象。
    ///
    /// 每次调用都产出独立的根；不同根（不同会话）上的链路互不干扰。
    pub fn root(self: &Arc<Self>, session: Session) -> CallRoot {
        CallRoot::new(Arc::clone(self), session)
    }

    /// 以原始 JSON 会话字段派生根对象的便捷入口。
    pub fn root_for(self: &Arc<Self>, session_fields: Value) -> CallRoot {
        self.root(Session::new(session_fields))
    }
}

impl Default for RouterContext {
    fn default() -> Self {
        Self::new()
    }
}
