use std::sync::Arc;

use serde_json::Value;

use crate::error::{RouterError, Result, codes};

/// 会话上调用签名字段的固定键名。
///
/// 该字段由会话生产方按 `<模块名>.<方法名>` 约定填充；裸根 `data` 捷径据此派生
/// 模块名。这是与会话生产方之间的固定契约，核心不做其他解析尝试。
pub const SIGNATURE_FIELD: &str = "callSignature";

/// `Session` 是核心眼中不透明的会话载体。
///
/// # 设计背景（Why）
/// - 路由核心的职责止步于“把会话注入分发载荷”；除一个可选的调用签名字段外，
///   核心从不检视会话内容，因此以 `serde_json::Value` 整体承载最为稳妥；
/// - 会话在每条链、每个委托之间反复传递，内部用 `Arc` 共享，克隆仅为指针拷贝。
///
/// # 契约说明（What）
/// - **前置条件**：会话在根对象创建时设置一次，之后不再变更；
/// - **后置条件**：`to_value()` 返回的快照与构造时的值深度相等，可安全写入载荷。
#[derive(Clone, Debug)]
pub struct Session {
    fields: Arc<Value>,
}

impl Session {
    /// 以任意 JSON 值构造会话。
    pub fn new(fields: Value) -> Self {
        Self {
            fields: Arc::new(fields),
        }
    }

    /// 读取可选的调用签名字段；字段缺失或非字符串时返回 `None`。
    pub fn call_signature(&self) -> Option<&str> {
        self.fields.get(SIGNATURE_FIELD).and_then(Value::as_str)
    }

    /// 访问会话的完整字段集。
    pub fn fields(&self) -> &Value {
        &self.fields
    }

    /// 生成用于注入分发载荷的会话快照。
    pub fn to_value(&self) -> Value {
        (*self.fields).clone()
    }
}

impl PartialEq for Session {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl Eq for Session {}

/// 从会话的调用签名派生模块名：取首个点号之前的非空片段。
///
/// # 设计意图（Why）
/// - 裸根 `data` 捷径要求“在会话自身模块的上下文中”读写数据，而会话只携带一条
///   点号分隔的调用签名；首段即完全限定模块名，无需再拼接后缀。
///
/// # 契约说明（What）
/// - **前置条件**：会话生产方已按固定契约填充 [`SIGNATURE_FIELD`]；
/// - **失败语义**：字段缺失、非字符串或首段为空时返回配置类错误
///   [`codes::SESSION_SIGNATURE`]，提示注入方修正会话来源。
pub(crate) fn module_from_session(session: &Session) -> Result<String> {
    let underivable = || {
        RouterError::configuration(
            codes::SESSION_SIGNATURE,
            "cannot determine module name from session call signature",
        )
    };
    let signature = session.call_signature().ok_or_else(underivable)?;
    let first = signature
        .split('.')
        .next()
        .filter(|segment| !segment.is_empty())
        .ok_or_else(underivable)?;
    Ok(first.to_owned())
}
