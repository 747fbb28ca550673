use serde_json::Value;

use crate::error::Result;
use crate::future::MethodFuture;

/// 一次分发调用的参数载荷：键值不透明，核心只负责注入 `session` 字段。
pub type CallArgs = serde_json::Map<String, Value>;

/// 分发器解析出的可执行方法。
///
/// 方法按值接收载荷并立即返回挂起结果；核心在拿到该闭包后只调用一次。
pub type BoxMethod = Box<dyn FnOnce(CallArgs) -> MethodFuture + Send>;

/// `Dispatcher` 是方法分发后端的能力契约。
///
/// # 设计背景（Why）
/// - 路由核心只校验路由元数据并拼装签名，签名如何落到可执行函数、模块数据存在
///   哪里，全部属于分发器的领域；以对象安全 trait 注入可以让测试桩与真实实现
///   在同一槽位互换；
/// - 解析失败的错误语义由分发器自有；核心以 `?` 原样转发，调用方看到的即是
///   分发器构造的错误（透传契约）。
///
/// # 契约说明（What）
/// - `resolve`：把 `模块名 + 后缀 + "." + 方法名` 形态的签名解析为可执行方法，
///   未知签名时返回分发器自己的错误；
/// - `get_data` / `set_data`：以完全限定模块名为键读写模块数据；存储归分发器
///   所有，核心不缓存、不合并、不检查值形态；
/// - **线程安全**：实现必须满足 `Send + Sync`，以便装入 `Arc` 跨线程共享。
pub trait Dispatcher: Send + Sync {
    /// 解析签名；未知签名时返回分发器自有的错误。
    fn resolve(&self, signature: &str) -> Result<BoxMethod>;

    /// 读取模块数据；键不存在时返回 `Ok(None)`。
    fn get_data(&self, qualified_name: &str) -> Result<Option<Value>>;

    /// 写入模块数据。
    fn set_data(&self, qualified_name: &str, value: Value) -> Result<()>;
}
