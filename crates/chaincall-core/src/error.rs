use core::fmt;
use std::borrow::Cow;

/// `ErrorCause` 封装底层原因，保持 `Send + Sync` 以方便跨线程传递。
pub type ErrorCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// `Result` 为本 crate 统一的返回值别名，默认错误类型为 [`RouterError`]。
///
/// # 设计意图（Why）
/// - 路由核心与协作方共享同一错误封装模型，日志与测试断言可直接按稳定错误码聚合；
/// - 避免在各处重复书写 `Result<_, RouterError>` 样板代码。
pub type Result<T, E = RouterError> = core::result::Result<T, E>;

/// 错误类别，对应路由核心的三段式错误分层。
///
/// # 设计背景（Why）
/// - 调用链失败的处置策略只取决于“谁的责任”：配置缺失（注入方）、链路违例（调用方）、
///   协作方自身故障（透传）。将该判定显式化，避免上层解析消息字符串推断语义。
///
/// # 契约说明（What）
/// - `Configuration`：某个必需的后端槽位未注入，或会话缺少派生模块名所需的调用签名；
/// - `Validation`：链路顺序违例——非法命名空间、过早发起调用、方法已定后的多余属性、
///   不允许的 data 写入上下文、非法 HTTP 动词；
/// - `Passthrough`：协作方（分发器、模型提供方、HTTP 客户端）在解析或执行期间抛出的
///   错误，核心不包装、不记录，原样递交调用方。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    Configuration,
    Validation,
    Passthrough,
}

/// `RouterError` 是路由核心唯一的可观察错误形态。
///
/// # 设计背景（Why）
/// - 状态机在违例点同步失败（fail-fast），排障人员需要稳定错误码来区分“配置缺失”
///   与“链路用错”，因此错误码采用 `'static` 字符串并集中登记在 [`codes`] 模块；
/// - 协作方错误必须原样透传：协作方契约直接以 `RouterError` 作为错误类型，核心侧
///   仅用 `?` 转发，不做二次包装，保证调用方看到的就是协作方构造的那个值。
///
/// # 逻辑解析（How）
/// - 结构体以 Builder 风格方法附加底层原因，并通过 `source()` 暴露完整错误链；
/// - `code` 承载稳定语义，`message` 面向排障人员，`kind` 驱动调用方的处置分支。
///
/// # 契约说明（What）
/// - **前置条件**：`code` 遵循 `<域>.<语义>` 约定；自定义码需由协作方自行备案；
/// - **后置条件**：返回值拥有独立所有权，满足 `Send + Sync + 'static`，可跨线程移动。
#[derive(Debug)]
pub struct RouterError {
    code: &'static str,
    message: Cow<'static, str>,
    kind: ErrorKind,
    cause: Option<ErrorCause>,
}

impl RouterError {
    /// 构造任意类别的错误，是三个便捷构造器的公共入口。
    pub fn new(kind: ErrorKind, code: &'static str, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            code,
            message: message.into(),
            kind,
            cause: None,
        }
    }

    /// 构造配置缺失类错误（某个必需的后端槽位未注入等）。
    pub fn configuration(code: &'static str, message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Configuration, code, message)
    }

    /// 构造链路违例类错误（顺序、保留字、上下文约束被破坏）。
    pub fn validation(code: &'static str, message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Validation, code, message)
    }

    /// 供协作方把自身故障装入统一错误域使用；核心本身从不调用该构造器。
    pub fn passthrough(code: &'static str, message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Passthrough, code, message)
    }

    /// 附带底层原因并返回新的错误，形成 `source()` 可遍历的错误链。
    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// 获取稳定错误码。
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// 获取人类可读的错误描述。
    pub fn message(&self) -> &str {
        &self.message
    }

    /// 获取错误类别。
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// 获取可选的底层原因。
    pub fn cause(&self) -> Option<&ErrorCause> {
        self.cause.as_ref()
    }
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for RouterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|boxed| boxed.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// 稳定错误码登记表。
///
/// # 设计意图（Why）
/// - 错误消息允许演进，错误码不允许：测试、日志聚合与自动化治理都按码值匹配；
/// - 命名遵循 `<域>.<语义>`，域与模块一一对应，便于按前缀归因。
pub mod codes {
    /// 分发器槽位未注入即发起调用。
    pub const DISPATCHER_REQUIRED: &str = "backend.dispatcher_required";
    /// 模型提供方槽位未注入即解析 `model` 链。
    pub const MODEL_PROVIDER_REQUIRED: &str = "backend.model_provider_required";
    /// HTTP 客户端槽位未注入即构造 HTTP 委托。
    pub const HTTP_CLIENT_REQUIRED: &str = "backend.http_client_required";

    /// 首段属性既非注册别名也非保留字 `http`。
    pub const INVALID_NAMESPACE: &str = "call.invalid_namespace";
    /// 在命名空间尚未设置时发起调用。
    pub const MISSING_NAMESPACE: &str = "call.missing_namespace";
    /// 在模块名尚未设置时发起调用。
    pub const MISSING_MODULE: &str = "call.missing_module";
    /// 在方法名尚未设置时发起调用。
    pub const MISSING_METHOD: &str = "call.missing_method";
    /// 命名空间、模块、方法均已设置后仍访问属性。
    pub const CHAIN_EXHAUSTED: &str = "call.chain_exhausted";

    /// 写入路径只接受 `data` 伪属性。
    pub const DATA_ONLY_PROPERTY: &str = "data.only_property";
    /// 方法名已设置后禁止写入 data。
    pub const DATA_METHOD_CONTEXT: &str = "data.method_context";
    /// 仅设置了命名空间、尚无模块名时禁止写入 data。
    pub const DATA_WITHOUT_MODULE: &str = "data.without_module";

    /// 会话缺少可解析的调用签名字段，无法派生模块名。
    pub const SESSION_SIGNATURE: &str = "session.signature_underivable";

    /// 尝试注册保留别名。
    pub const ALIAS_RESERVED: &str = "namespace.alias_reserved";
    /// 别名不是非空字符串。
    pub const ALIAS_INVALID: &str = "namespace.alias_invalid";
    /// 后缀不是非空字符串。
    pub const SUFFIX_INVALID: &str = "namespace.suffix_invalid";

    /// 捕获的名称既非动词字面量也非 `request`。
    pub const HTTP_METHOD_INVALID: &str = "http.method_invalid";
    /// 以与捕获名称不匹配的参数形态调用 HTTP 委托。
    pub const HTTP_CALL_SHAPE: &str = "http.call_shape";
}
