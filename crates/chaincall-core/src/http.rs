use core::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::trace;

use crate::error::{RouterError, Result, codes};
use crate::session::Session;

/// `HttpClient` 是出站 HTTP 后端的能力契约。
///
/// # 契约说明（What）
/// - 每个受支持的动词各有一个同名方法，签名统一为 `(target, options, session)`；
/// - `request` 为泛化入口，签名为 `(options, session)`，目标地址由 `options` 自述；
/// - 所有方法返回挂起结果，失败语义由客户端自有，核心原样透传。
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// 发起 GET 请求。
    async fn get(&self, target: &str, options: Value, session: &Session) -> Result<Value>;

    /// 发起 POST 请求。
    async fn post(&self, target: &str, options: Value, session: &Session) -> Result<Value>;

    /// 发起 PUT 请求。
    async fn put(&self, target: &str, options: Value, session: &Session) -> Result<Value>;

    /// 发起 DELETE 请求。
    async fn delete(&self, target: &str, options: Value, session: &Session) -> Result<Value>;

    /// 发起泛化请求。
    async fn request(&self, options: Value, session: &Session) -> Result<Value>;
}

/// 受支持的 HTTP 动词字面量。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpVerb {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "get" => Some(Self::Get),
            "post" => Some(Self::Post),
            "put" => Some(Self::Put),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }

    /// 动词的小写字面量，与链路中捕获的属性名一致。
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Delete => "delete",
        }
    }
}

/// HTTP 委托的调用形态：动词委托带目标地址，泛化委托只带选项。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpCallKind {
    /// 转发到客户端的同名动词方法。
    Verb(HttpVerb),
    /// 转发到客户端的泛化 `request` 方法。
    Request,
}

/// `HttpDelegate` 是 `http` 命名空间链的终端产物：一个会话默认化的纯转发器。
///
/// # 设计背景（Why）
/// - 链路在模块步捕获到动词名后即告消费，后续的实际请求发生在调用方手里；
///   把客户端句柄、捕获动词与绑定会话一起封进委托，调用方无需再接触上下文；
/// - 槽位校验与动词校验都发生在创建时（fail-fast）：链路错误在链路处报出，
///   而不是拖到第一次发请求。
///
/// # 契约说明（What）
/// - **创建**：客户端槽位未注入时由链路侧报配置错误；捕获名非法时报
///   [`codes::HTTP_METHOD_INVALID`]；
/// - **调用**：`send` 服务于动词委托，`dispatch` 服务于泛化委托，形态与捕获名
///   不匹配时报 [`codes::HTTP_CALL_SHAPE`]；
/// - **会话默认化**：显式传入的会话覆盖绑定会话，否则使用绑定会话；
/// - 不做重试、超时与响应解析。
pub struct HttpDelegate {
    client: Arc<dyn HttpClient>,
    kind: HttpCallKind,
    session: Session,
}

/// 手写 `Debug`：客户端句柄不透明，只报告捕获的调用形态。
impl fmt::Debug for HttpDelegate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpDelegate")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl HttpDelegate {
    /// 以链路捕获的名称创建委托；名称必须是动词字面量或 `request`。
    pub(crate) fn new(client: Arc<dyn HttpClient>, name: &str, session: Session) -> Result<Self> {
        let kind = if name == "request" {
            HttpCallKind::Request
        } else {
            HttpVerb::from_name(name)
                .map(HttpCallKind::Verb)
                .ok_or_else(|| {
                    RouterError::validation(
                        codes::HTTP_METHOD_INVALID,
                        format!("invalid method {name} for http client"),
                    )
                })?
        };
        trace!(?kind, "creating http delegate");
        Ok(Self {
            client,
            kind,
            session,
        })
    }

    /// 委托的调用形态。
    pub fn kind(&self) -> HttpCallKind {
        self.kind
    }

    /// 动词委托入口：转发 `(target, options, 覆盖会话 ?? 绑定会话)` 到同名方法。
    pub async fn send(
        &self,
        target: &str,
        options: Value,
        session_override: Option<&Session>,
    ) -> Result<Value> {
        let session = session_override.unwrap_or(&self.session);
        match self.kind {
            HttpCallKind::Verb(HttpVerb::Get) => self.client.get(target, options, session).await,
            HttpCallKind::Verb(HttpVerb::Post) => self.client.post(target, options, session).await,
            HttpCallKind::Verb(HttpVerb::Put) => self.client.put(target, options, session).await,
            HttpCallKind::Verb(HttpVerb::Delete) => {
                self.client.delete(target, options, session).await
            }
            HttpCallKind::Request => Err(RouterError::validation(
                codes::HTTP_CALL_SHAPE,
                "request delegate does not accept a target; use dispatch",
            )),
        }
    }

    /// 泛化委托入口：转发 `(options, 覆盖会话 ?? 绑定会话)` 到 `request`。
    pub async fn dispatch(
        &self,
        options: Value,
        session_override: Option<&Session>,
    ) -> Result<Value> {
        let session = session_override.unwrap_or(&self.session);
        match self.kind {
            HttpCallKind::Request => self.client.request(options, session).await,
            HttpCallKind::Verb(verb) => Err(RouterError::validation(
                codes::HTTP_CALL_SHAPE,
                format!("verb delegate {} requires a target; use send", verb.as_str()),
            )),
        }
    }
}
