use core::future::Future;
use core::pin::Pin;

use serde_json::Value;

use crate::error::RouterError;

/// `BoxFuture` 是本 crate 对外递交异步结果时使用的通用 Future 包装。
///
/// # 设计背景（Why）
/// - 分发器解析出的方法与 HTTP 客户端都可能返回挂起结果；核心既不等待也不阻塞，
///   只负责把挂起值原样递交调用方，因此需要一个对象安全、可跨线程的统一表达。
///
/// # 契约说明（What）
/// - 约束 Future 为 `Send + 'a`，可安全跨线程移动；由调用方自行决定执行器与时序。
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// 一次分发调用的挂起结果。
///
/// 核心在校验与签名解析全部同步完成后返回该 Future；拒绝（协作方异步失败）同样
/// 由调用方在 `await` 处观察，核心不拦截。
pub type MethodFuture = BoxFuture<'static, Result<Value, RouterError>>;
