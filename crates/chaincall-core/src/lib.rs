#![deny(unsafe_code)]
#![doc = "chaincall-core: 会话绑定的调用路由前端。"]
#![doc = ""]
#![doc = "调用方以一串严格有序的属性访问表达“调用命名空间 N 下模块 X 的方法 M，绑定会话 S”，"]
#![doc = "核心负责累积并校验这份短小的调用描述符，再交给注入的协作方执行："]
#![doc = "方法分发器（签名 → 可执行函数）、模型提供方（名称 → 会话可绑定模型）、"]
#![doc = "HTTP 客户端（动词/泛化出站请求）。核心自身不做 I/O、不持久化、不含业务逻辑。"]
#![doc = ""]
#![doc = "== 使用骨架 =="]
#![doc = "1. 进程启动期构造一份 [`RouterContext`]，注册自定义命名空间并注入后端槽位；"]
#![doc = "2. 每个会话通过 [`RouterContext::root`] 派生一个 [`CallRoot`]；"]
#![doc = "3. 链式推进：`root.step(\"module\")? → chain.step(\"foo\")? → chain.step(\"bar\")?`，"]
#![doc = "   终端要么 `invoke(载荷)` 得到挂起结果，要么在 `model`/`http` 命名空间得到委托。"]

pub mod backend;
pub mod call;
pub mod context;
mod data;
pub mod dispatch;
pub mod error;
pub mod future;
pub mod http;
pub mod model;
pub mod namespace;
pub mod session;

pub use backend::BackendRegistry;
pub use call::{CallChain, CallRoot, Step};
pub use context::RouterContext;
pub use dispatch::{BoxMethod, CallArgs, Dispatcher};
pub use error::{ErrorCause, ErrorKind, Result, RouterError, codes};
pub use future::{BoxFuture, MethodFuture};
pub use http::{HttpCallKind, HttpClient, HttpDelegate, HttpVerb};
pub use model::{ModelHandle, ModelObject, ModelProvider};
pub use namespace::NamespaceRegistry;
pub use session::{SIGNATURE_FIELD, Session};
