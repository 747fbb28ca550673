use core::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::trace;

use crate::context::RouterContext;
use crate::data;
use crate::dispatch::CallArgs;
use crate::error::{RouterError, Result, codes};
use crate::future::MethodFuture;
use crate::http::HttpDelegate;
use crate::model::ModelObject;
use crate::session::{self, Session};

/// 载荷中会话字段的固定键名；终端调用时核心总会覆盖写入该字段。
const SESSION_ARG: &str = "session";

/// 一次属性访问的产物：要么链路继续，要么抵达某个终端行为。
///
/// # 契约说明（What）
/// - `Chain`：链路尚未消费，取出其中的链值继续下一步；
/// - `Session`：根上的 `session` 叶子读取，不是路由步骤；
/// - `Data`：`data` 伪属性的读取结果，链路已消费;
/// - `Model`：`model` 命名空间的终端产物，已绑定当前会话；
/// - `Http`：`http` 命名空间的终端产物，会话默认化的转发器。
pub enum Step {
    Chain(CallChain),
    Session(Session),
    Data(Option<Value>),
    Model(Arc<dyn ModelObject>),
    Http(HttpDelegate),
}

/// 手写 `Debug`：`Model` 变体对核心不透明，只报告抵达的变体形态。
impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chain(_) => f.write_str("Step::Chain"),
            Self::Session(session) => f.debug_tuple("Step::Session").field(session).finish(),
            Self::Data(value) => f.debug_tuple("Step::Data").field(value).finish(),
            Self::Model(_) => f.write_str("Step::Model"),
            Self::Http(delegate) => f.debug_tuple("Step::Http").field(delegate).finish(),
        }
    }
}

/// `CallRoot` 是每个会话一个的调用根对象。
///
/// # 设计背景（Why）
/// - 若让所有链路共享根上的一条活动调用记录，复用就得依赖“消费前克隆、消费后
///   复位”的时序纪律；这里改为每条链一个轻量自有值：根只持有上下文与会话，
///   `chain()` 随取随造，消费即丢弃。复位时序隐患就此消失，而“同一根对象可
///   连续服务多条互不相关链路”的外部语义保持不变；
/// - 不同根（不同会话）天然可并发：链值互不共享。
///
/// # 契约说明（What）
/// - 会话在根创建时绑定一次，之后只读；
/// - 根上的便捷方法等价于在一条全新链路上执行同名操作。
pub struct CallRoot {
    ctx: Arc<RouterContext>,
    session: Session,
}

impl CallRoot {
    pub(crate) fn new(ctx: Arc<RouterContext>, session: Session) -> Self {
        Self { ctx, session }
    }

    /// 访问绑定的会话。
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// 访问派生该根的上下文。
    pub fn context(&self) -> &Arc<RouterContext> {
        &self.ctx
    }

    /// 为一条新链路铸造空链值。
    pub fn chain(&self) -> CallChain {
        CallChain {
            ctx: Arc::clone(&self.ctx),
            session: self.session.clone(),
            namespace: None,
            module: None,
            method: None,
        }
    }

    /// 在全新链路上执行一次属性访问。
    pub fn step(&self, property: &str) -> Result<Step> {
        self.chain().step(property)
    }

    /// 在根上直接发起调用；命名空间尚未设置，必然以链路违例失败。
    pub fn invoke(&self, args: Option<CallArgs>) -> Result<MethodFuture> {
        self.chain().invoke(args)
    }

    /// 裸根 `data` 读取捷径：在会话自身模块的上下文中读模块数据。
    ///
    /// 模块名取自会话调用签名的首段（固定契约，见 [`crate::session`]）；签名
    /// 不可派生时报配置错误。
    pub fn data(&self) -> Result<Option<Value>> {
        let module = session::module_from_session(&self.session)?;
        data::read(&self.ctx, &module)
    }

    /// 裸根 `data` 写入捷径，上下文派生规则与读取一致。
    pub fn set_data(&self, value: Value) -> Result<()> {
        self.chain().set("data", value)
    }
}

/// `CallChain` 是一条调用链的全部状态：命名空间、模块、方法严格自左向右填充。
///
/// # 逻辑解析（How）
/// - 三个字段的 `Option` 排布即状态机：`Empty → NamespaceSet → ModuleSet →
///   MethodSet`，每一步只可能填充最左侧的空位，已填字段绝不覆盖；
/// - 所有推进方法按值消费 `self`：终端行为（调用、委托、data 读写）吃掉链值，
///   于是“一条链只消费一次”由所有权系统保证，无需运行时复位。
pub struct CallChain {
    ctx: Arc<RouterContext>,
    session: Session,
    namespace: Option<String>,
    module: Option<String>,
    method: Option<String>,
}

impl CallChain {
    /// 已捕获的命名空间别名。
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// 已捕获的模块名。
    pub fn module(&self) -> Option<&str> {
        self.module.as_deref()
    }

    /// 已捕获的方法名。
    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    /// 以属性名 `property` 推进状态机一步。
    ///
    /// # 契约说明（What）
    /// - **Empty**：`session` 返回会话（叶子读取）；`data` 走会话模块数据读取；
    ///   `http` 与注册别名设置命名空间；其余属性报非法命名空间；
    /// - **NamespaceSet**：设置模块名；`model`/`http` 命名空间在此抵达终端；
    /// - **ModuleSet**：`data` 走限定名数据读取；其余属性设置方法名；
    /// - **MethodSet**：任何访问都是违例，错误点名属性与完整三元组。
    pub fn step(self, property: &str) -> Result<Step> {
        let namespace = match self.namespace.clone() {
            None => return self.step_namespace(property),
            Some(namespace) => namespace,
        };
        let module = match self.module.clone() {
            None => return self.step_module(&namespace, property),
            Some(module) => module,
        };
        match self.method.clone() {
            None => self.step_method(&namespace, &module, property),
            Some(method) => Err(RouterError::validation(
                codes::CHAIN_EXHAUSTED,
                format!(
                    "property accessed with namespace, module, and method already set: \
                     {property}, {namespace}, {module}, {method}"
                ),
            )),
        }
    }

    fn step_namespace(mut self, property: &str) -> Result<Step> {
        match property {
            "session" => Ok(Step::Session(self.session.clone())),
            "data" => {
                let module = session::module_from_session(&self.session)?;
                Ok(Step::Data(data::read(&self.ctx, &module)?))
            }
            _ => {
                if property == "http" || self.ctx.namespaces().contains(property) {
                    self.namespace = Some(property.to_owned());
                    Ok(Step::Chain(self))
                } else {
                    Err(RouterError::validation(
                        codes::INVALID_NAMESPACE,
                        format!("invalid namespace {property}"),
                    ))
                }
            }
        }
    }

    fn step_module(mut self, namespace: &str, property: &str) -> Result<Step> {
        match namespace {
            "model" => {
                let provider = self.ctx.backends().require_model_provider()?;
                let handle = provider.model_for(property)?;
                Ok(Step::Model(handle.bind(&self.session)))
            }
            "http" => {
                let client = self.ctx.backends().require_http_client()?;
                let delegate = HttpDelegate::new(client, property, self.session.clone())?;
                Ok(Step::Http(delegate))
            }
            _ => {
                self.module = Some(property.to_owned());
                Ok(Step::Chain(self))
            }
        }
    }

    fn step_method(mut self, namespace: &str, module: &str, property: &str) -> Result<Step> {
        if property == "data" {
            let suffix = self.resolve_suffix(namespace)?;
            let qualified = format!("{module}{suffix}");
            return Ok(Step::Data(data::read(&self.ctx, &qualified)?));
        }
        self.method = Some(property.to_owned());
        Ok(Step::Chain(self))
    }

    /// 以可选载荷发起终端调用，返回未被等待的挂起结果。
    ///
    /// # 契约说明（What）
    /// - 分发器槽位缺失优先报配置错误，其后才是链路完整性校验；
    /// - 签名按 `模块名 + 后缀 + "." + 方法名` 构造；分发器的解析失败原样透传；
    /// - 载荷缺省为空对象；`session` 字段总被绑定会话覆盖写入。
    pub fn invoke(self, args: Option<CallArgs>) -> Result<MethodFuture> {
        let dispatcher = self.ctx.backends().require_dispatcher()?;
        let namespace = self.namespace.as_deref().ok_or_else(|| {
            RouterError::validation(codes::MISSING_NAMESPACE, "method call without namespace")
        })?;
        let module = self.module.as_deref().ok_or_else(|| {
            RouterError::validation(codes::MISSING_MODULE, "method call without module name")
        })?;
        let method = self.method.as_deref().ok_or_else(|| {
            RouterError::validation(codes::MISSING_METHOD, "method call without method name")
        })?;
        let suffix = self.resolve_suffix(namespace)?;
        let signature = format!("{module}{suffix}.{method}");
        trace!(signature = %signature, "dispatching chain");
        let resolved = dispatcher.resolve(&signature)?;
        let mut args = args.unwrap_or_default();
        args.insert(SESSION_ARG.to_owned(), self.session.to_value());
        Ok(resolved(args))
    }

    /// 写入路径：向 `data` 伪属性赋值。
    ///
    /// # 契约说明（What）
    /// - 属性名必须是字面量 `data`；
    /// - **Empty**：限定名取自会话调用签名（派生失败报配置错误）；
    /// - **NamespaceSet**：尚无模块名，违例；
    /// - **ModuleSet**：限定名为 `模块名 + 后缀`；
    /// - **MethodSet**：方法上下文禁止写入，违例。
    pub fn set(self, property: &str, value: Value) -> Result<()> {
        if property != "data" {
            return Err(RouterError::validation(
                codes::DATA_ONLY_PROPERTY,
                format!("can only set value for data: {property}"),
            ));
        }
        let qualified = match (
            self.namespace.as_deref(),
            self.module.as_deref(),
            self.method.as_deref(),
        ) {
            (None, _, _) => session::module_from_session(&self.session)?,
            (Some(_), None, _) => {
                return Err(RouterError::validation(
                    codes::DATA_WITHOUT_MODULE,
                    "cannot set data without module name",
                ));
            }
            (Some(_), Some(_), Some(_)) => {
                return Err(RouterError::validation(
                    codes::DATA_METHOD_CONTEXT,
                    "cannot set data in method context",
                ));
            }
            (Some(namespace), Some(module), None) => {
                let suffix = self.resolve_suffix(namespace)?;
                format!("{module}{suffix}")
            }
        };
        data::write(&self.ctx, &qualified, value)
    }

    fn resolve_suffix(&self, namespace: &str) -> Result<String> {
        self.ctx.namespaces().resolve(namespace).ok_or_else(|| {
            RouterError::validation(
                codes::INVALID_NAMESPACE,
                format!("invalid namespace {namespace}"),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use futures::executor::block_on;
    use serde_json::json;

    use super::*;
    use crate::dispatch::{BoxMethod, Dispatcher};
    use crate::error::ErrorKind;

    /// 分发器桩：按签名登记返回值，并持有一份进程内数据表。
    #[derive(Default)]
    struct StubDispatcher {
        methods: HashMap<String, Value>,
        data: Mutex<HashMap<String, Value>>,
        seen_signatures: Mutex<Vec<String>>,
        seen_args: Mutex<Vec<CallArgs>>,
    }

    impl StubDispatcher {
        fn with_method(signature: &str, ret: Value) -> Self {
            let mut methods = HashMap::new();
            methods.insert(signature.to_owned(), ret);
            Self {
                methods,
                ..Self::default()
            }
        }
    }

    impl Dispatcher for Arc<StubDispatcher> {
        fn resolve(&self, signature: &str) -> Result<BoxMethod> {
            self.seen_signatures.lock().unwrap().push(signature.to_owned());
            let ret = self.methods.get(signature).cloned().ok_or_else(|| {
                RouterError::passthrough("dispatch.unknown_signature", format!("FOOBAR {signature}"))
            })?;
            let stub = Arc::clone(self);
            Ok(Box::new(move |args| -> MethodFuture {
                stub.seen_args.lock().unwrap().push(args);
                Box::pin(async move { Ok(ret) })
            }))
        }

        fn get_data(&self, qualified_name: &str) -> Result<Option<Value>> {
            Ok(self.data.lock().unwrap().get(qualified_name).cloned())
        }

        fn set_data(&self, qualified_name: &str, value: Value) -> Result<()> {
            self.data.lock().unwrap().insert(qualified_name.to_owned(), value);
            Ok(())
        }
    }

    fn session() -> Session {
        Session::new(json!({
            "sessionId": "11111111111111111111111111111111",
            "callSignature": "fooModule.bar",
        }))
    }

    fn harness(dispatcher: StubDispatcher) -> (Arc<RouterContext>, Arc<StubDispatcher>) {
        let ctx = Arc::new(RouterContext::new());
        let stub = Arc::new(dispatcher);
        ctx.backends().set_dispatcher(Some(Arc::new(Arc::clone(&stub))));
        (ctx, stub)
    }

    fn unwrap_chain(step: Step) -> CallChain {
        match step {
            Step::Chain(chain) => chain,
            _ => panic!("该步骤应返回可继续的链值"),
        }
    }

    /// 取出调用失败的错误；挂起结果自身无 `Debug`，不能直接 `unwrap_err`。
    fn unwrap_invoke_err(result: Result<MethodFuture>) -> RouterError {
        match result {
            Ok(_) => panic!("调用不应返回挂起结果"),
            Err(err) => err,
        }
    }

    #[test]
    fn full_chain_builds_signature_and_injects_session() {
        let (ctx, stub) = harness(StubDispatcher::with_method("fooModule.bar", json!("foo")));
        let root = ctx.root(session());

        let chain = unwrap_chain(root.step("module").unwrap());
        let chain = unwrap_chain(chain.step("foo").unwrap());
        let chain = unwrap_chain(chain.step("bar").unwrap());
        let future = chain.invoke(None).expect("三元组完整时应返回挂起结果");
        assert_eq!(block_on(future).unwrap(), json!("foo"));

        assert_eq!(
            stub.seen_signatures.lock().unwrap().as_slice(),
            ["fooModule.bar"]
        );
        let seen_args = stub.seen_args.lock().unwrap();
        assert_eq!(
            seen_args[0].get("session"),
            Some(&session().to_value()),
            "载荷应注入绑定会话"
        );
    }

    #[test]
    fn session_entry_in_caller_payload_is_overwritten() {
        let (ctx, stub) = harness(StubDispatcher::with_method("fooModule.bar", json!("foo")));
        let root = ctx.root(session());

        let mut args = CallArgs::new();
        args.insert("session".to_owned(), json!("spoofed"));
        args.insert("foo".to_owned(), json!(true));
        let chain = unwrap_chain(root.step("module").unwrap());
        let chain = unwrap_chain(chain.step("foo").unwrap());
        let chain = unwrap_chain(chain.step("bar").unwrap());
        block_on(chain.invoke(Some(args)).unwrap()).unwrap();

        let seen_args = stub.seen_args.lock().unwrap();
        assert_eq!(seen_args[0].get("session"), Some(&session().to_value()));
        assert_eq!(seen_args[0].get("foo"), Some(&json!(true)), "其余字段原样保留");
    }

    #[test]
    fn premature_invocation_reports_the_first_missing_field() {
        let (ctx, _stub) = harness(StubDispatcher::default());
        let root = ctx.root(session());

        let err = unwrap_invoke_err(root.invoke(None));
        assert_eq!(err.code(), codes::MISSING_NAMESPACE);
        assert!(err.message().contains("without namespace"));

        let chain = unwrap_chain(root.step("module").unwrap());
        let err = unwrap_invoke_err(chain.invoke(None));
        assert_eq!(err.code(), codes::MISSING_MODULE);
        assert!(err.message().contains("without module name"));

        let chain = unwrap_chain(root.step("module").unwrap());
        let chain = unwrap_chain(chain.step("foo").unwrap());
        let err = unwrap_invoke_err(chain.invoke(None));
        assert_eq!(err.code(), codes::MISSING_METHOD);
        assert!(err.message().contains("without method name"));
    }

    #[test]
    fn fourth_property_names_property_and_full_triple() {
        let (ctx, _stub) = harness(StubDispatcher::default());
        let root = ctx.root(session());

        let chain = unwrap_chain(root.step("module").unwrap());
        let chain = unwrap_chain(chain.step("foo").unwrap());
        let chain = unwrap_chain(chain.step("bar").unwrap());
        let err = chain.step("bam").unwrap_err();
        assert_eq!(err.code(), codes::CHAIN_EXHAUSTED);
        for token in ["bam", "module", "foo", "bar"] {
            assert!(
                err.message().contains(token),
                "错误消息应点名违例属性与完整三元组，缺少 {token}"
            );
        }
    }

    #[test]
    fn step_debug_names_the_reached_variant() {
        let (ctx, _stub) = harness(StubDispatcher::default());
        let root = ctx.root(session());
        assert_eq!(format!("{:?}", root.step("module").unwrap()), "Step::Chain");
        assert!(format!("{:?}", root.step("data").unwrap()).starts_with("Step::Data"));
    }

    #[test]
    fn invalid_namespace_is_rejected_at_the_first_step() {
        let (ctx, _stub) = harness(StubDispatcher::default());
        let root = ctx.root(session());
        let err = root.step("foo").unwrap_err();
        assert_eq!(err.code(), codes::INVALID_NAMESPACE);
        assert!(err.message().contains("invalid namespace foo"));
    }

    #[test]
    fn session_read_is_a_leaf_not_a_routing_step() {
        let (ctx, _stub) = harness(StubDispatcher::default());
        let root = ctx.root(session());
        match root.step("session").unwrap() {
            Step::Session(seen) => assert_eq!(seen, session()),
            _ => panic!("session 读取应返回会话本身"),
        }
        // 叶子读取不影响根对象继续服务新链路。
        assert!(matches!(root.step("module").unwrap(), Step::Chain(_)));
    }

    #[test]
    fn dispatcher_missing_takes_priority_over_chain_validation() {
        let ctx = Arc::new(RouterContext::new());
        let root = ctx.root(session());
        let err = unwrap_invoke_err(root.invoke(None));
        assert_eq!(err.code(), codes::DISPATCHER_REQUIRED);
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn dispatcher_resolution_error_bubbles_unchanged() {
        let (ctx, _stub) = harness(StubDispatcher::default());
        let root = ctx.root(session());
        let chain = unwrap_chain(root.step("module").unwrap());
        let chain = unwrap_chain(chain.step("foo").unwrap());
        let chain = unwrap_chain(chain.step("bar").unwrap());
        let err = unwrap_invoke_err(chain.invoke(None));
        assert_eq!(err.kind(), ErrorKind::Passthrough, "解析失败必须原样透传");
        assert!(err.message().starts_with("FOOBAR"));
    }

    #[test]
    fn data_read_at_module_context_uses_qualified_name() {
        let (ctx, stub) = harness(StubDispatcher::default());
        stub.data
            .lock()
            .unwrap()
            .insert("fooModule".to_owned(), json!({ "cached": true }));
        let root = ctx.root(session());

        let chain = unwrap_chain(root.step("module").unwrap());
        let chain = unwrap_chain(chain.step("foo").unwrap());
        match chain.step("data").unwrap() {
            Step::Data(value) => assert_eq!(value, Some(json!({ "cached": true }))),
            _ => panic!("data 读取应返回数据值"),
        }
    }

    #[test]
    fn bare_root_data_roundtrip_via_session_signature() {
        let (ctx, stub) = harness(StubDispatcher::default());
        let root = ctx.root(session());

        assert_eq!(root.data().unwrap(), None);
        root.set_data(json!({ "draft": 1 })).unwrap();
        assert_eq!(root.data().unwrap(), Some(json!({ "draft": 1 })));
        assert_eq!(
            stub.data.lock().unwrap().get("fooModule"),
            Some(&json!({ "draft": 1 })),
            "裸根路径应以签名首段为键"
        );
    }

    #[test]
    fn bare_root_data_without_signature_is_a_configuration_error() {
        let (ctx, _stub) = harness(StubDispatcher::default());
        let root = ctx.root(Session::new(json!({ "sessionId": "2222" })));
        let err = root.data().unwrap_err();
        assert_eq!(err.code(), codes::SESSION_SIGNATURE);
        let err = root.set_data(json!(1)).unwrap_err();
        assert_eq!(err.code(), codes::SESSION_SIGNATURE);
    }

    #[test]
    fn data_set_context_rules() {
        let (ctx, _stub) = harness(StubDispatcher::default());
        let root = ctx.root(session());

        // 仅命名空间：尚无模块名。
        let chain = unwrap_chain(root.step("module").unwrap());
        let err = chain.set("data", json!(1)).unwrap_err();
        assert_eq!(err.code(), codes::DATA_WITHOUT_MODULE);

        // 方法上下文：禁止写入。
        let chain = unwrap_chain(root.step("module").unwrap());
        let chain = unwrap_chain(chain.step("foo").unwrap());
        let chain = unwrap_chain(chain.step("bar").unwrap());
        let err = chain.set("data", json!(1)).unwrap_err();
        assert_eq!(err.code(), codes::DATA_METHOD_CONTEXT);

        // 模块上下文：合法写入，键为限定名。
        let chain = unwrap_chain(root.step("module").unwrap());
        let chain = unwrap_chain(chain.step("foo").unwrap());
        chain.set("data", json!(2)).expect("模块上下文应允许写入 data");

        // data 之外的属性一律拒绝。
        let chain = unwrap_chain(root.step("module").unwrap());
        let chain = unwrap_chain(chain.step("foo").unwrap());
        let err = chain.set("other", json!(1)).unwrap_err();
        assert_eq!(err.code(), codes::DATA_ONLY_PROPERTY);
        assert!(err.message().contains("can only set value for data"));
    }

    #[test]
    fn custom_alias_builds_signature_with_registered_suffix() {
        let (ctx, stub) = harness(StubDispatcher::with_method("fooMyNamespace.bar", json!("foo")));
        ctx.namespaces().register("myNamespace", "MyNamespace").unwrap();
        let root = ctx.root(session());

        let chain = unwrap_chain(root.step("myNamespace").unwrap());
        let chain = unwrap_chain(chain.step("foo").unwrap());
        let chain = unwrap_chain(chain.step("bar").unwrap());
        assert_eq!(block_on(chain.invoke(None).unwrap()).unwrap(), json!("foo"));
        assert_eq!(
            stub.seen_signatures.lock().unwrap().as_slice(),
            ["fooMyNamespace.bar"]
        );
    }

    #[test]
    fn same_root_serves_independent_chains_in_sequence() {
        let mut methods = HashMap::new();
        methods.insert("fooModule.bar".to_owned(), json!("foo"));
        methods.insert("barModule.bam".to_owned(), json!("baz"));
        let (ctx, stub) = harness(StubDispatcher {
            methods,
            ..StubDispatcher::default()
        });
        let root = ctx.root(session());

        let chain = unwrap_chain(root.step("module").unwrap());
        let chain = unwrap_chain(chain.step("foo").unwrap());
        let chain = unwrap_chain(chain.step("bar").unwrap());
        assert_eq!(block_on(chain.invoke(None).unwrap()).unwrap(), json!("foo"));

        // 同一根对象立即可服务下一条互不相关的链路。
        let chain = unwrap_chain(root.step("module").unwrap());
        let chain = unwrap_chain(chain.step("bar").unwrap());
        let chain = unwrap_chain(chain.step("bam").unwrap());
        assert_eq!(block_on(chain.invoke(None).unwrap()).unwrap(), json!("baz"));

        assert_eq!(
            stub.seen_signatures.lock().unwrap().as_slice(),
            ["fooModule.bar", "barModule.bam"]
        );
    }
}
