use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::dispatch::Dispatcher;
use crate::error::{RouterError, Result, codes};
use crate::http::HttpClient;
use crate::model::ModelProvider;

/// `BackendRegistry` 持有三个互相独立的协作方槽位。
///
/// # 设计背景（Why）
/// - 分发器、模型提供方与 HTTP 客户端由外部注入而非在此构造，避免核心与
///   协作方实现形成环形依赖；三个槽位彼此无顺序约束，某条解析路径只在
///   *自己* 需要的槽位缺失时失败；
/// - 槽位值在“使用时刻”读取而非构造时缓存：两次调用之间的重新注入必须被
///   下一次调用观察到，这是注入契约的一部分。
///
/// # 契约说明（What）
/// - `set_*(None)` 即清空槽位；注入时不校验值形态，校验推迟到槽位被使用时；
/// - `require_*` 在槽位缺失时返回配置类错误，错误码按槽位区分。
pub struct BackendRegistry {
    dispatcher: RwLock<Option<Arc<dyn Dispatcher>>>,
    model_provider: RwLock<Option<Arc<dyn ModelProvider>>>,
    http_client: RwLock<Option<Arc<dyn HttpClient>>>,
}

impl BackendRegistry {
    /// 构造三个槽位均为空的注册表。
    pub fn new() -> Self {
        Self {
            dispatcher: RwLock::new(None),
            model_provider: RwLock::new(None),
            http_client: RwLock::new(None),
        }
    }

    /// 注入或清空分发器槽位。
    pub fn set_dispatcher(&self, dispatcher: Option<Arc<dyn Dispatcher>>) {
        debug!(present = dispatcher.is_some(), "swapping dispatcher backend");
        *self.dispatcher.write() = dispatcher;
    }

    /// 注入或清空模型提供方槽位。
    pub fn set_model_provider(&self, provider: Option<Arc<dyn ModelProvider>>) {
        debug!(present = provider.is_some(), "swapping model provider backend");
        *self.model_provider.write() = provider;
    }

    /// 注入或清空 HTTP 客户端槽位。
    pub fn set_http_client(&self, client: Option<Arc<dyn HttpClient>>) {
        debug!(present = client.is_some(), "swapping http client backend");
        *self.http_client.write() = client;
    }

    /// 读取分发器槽位的当前值。
    pub fn dispatcher(&self) -> Option<Arc<dyn Dispatcher>> {
        self.dispatcher.read().clone()
    }

    /// 读取模型提供方槽位的当前值。
    pub fn model_provider(&self) -> Option<Arc<dyn ModelProvider>> {
        self.model_provider.read().clone()
    }

    /// 读取 HTTP 客户端槽位的当前值。
    pub fn http_client(&self) -> Option<Arc<dyn HttpClient>> {
        self.http_client.read().clone()
    }

    /// 取分发器，缺失即报配置错误。
    pub fn require_dispatcher(&self) -> Result<Arc<dyn Dispatcher>> {
        self.dispatcher().ok_or_else(|| {
            RouterError::configuration(codes::DISPATCHER_REQUIRED, "dispatcher backend required")
        })
    }

    /// 取模型提供方，缺失即报配置错误。
    pub fn require_model_provider(&self) -> Result<Arc<dyn ModelProvider>> {
        self.model_provider().ok_or_else(|| {
            RouterError::configuration(
                codes::MODEL_PROVIDER_REQUIRED,
                "model provider backend required",
            )
        })
    }

    /// 取 HTTP 客户端，缺失即报配置错误。
    pub fn require_http_client(&self) -> Result<Arc<dyn HttpClient>> {
        self.http_client().ok_or_else(|| {
            RouterError::configuration(codes::HTTP_CLIENT_REQUIRED, "http client backend required")
        })
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}
