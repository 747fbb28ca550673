use std::any::Any;
use std::sync::Arc;

use crate::error::Result;
use crate::session::Session;

/// `ModelProvider` 是模型后端的能力契约。
///
/// # 契约说明（What）
/// - `model_for` 按名称解析出通用模型句柄；名称未知时返回提供方自有的错误，
///   核心原样透传；
/// - 解析出的句柄与会话绑定后归调用方使用，其后续行为完全属于提供方领域。
pub trait ModelProvider: Send + Sync {
    /// 解析指定名称的模型句柄。
    fn model_for(&self, name: &str) -> Result<Arc<dyn ModelHandle>>;
}

/// 未绑定会话的通用模型句柄。
pub trait ModelHandle: Send + Sync {
    /// 把句柄绑定到指定会话，返回会话作用域的模型对象。
    fn bind(&self, session: &Session) -> Arc<dyn ModelObject>;
}

/// 会话绑定后的模型对象；对核心完全不透明。
///
/// # 设计意图（Why）
/// - `model` 链的终端行为只是“解析 + 绑定 + 交还”；核心不了解也不约束模型
///   对象的任何能力，仅保留 `as_any` 供调用方向具体类型回落。
pub trait ModelObject: Send + Sync {
    /// 以 `Any` 暴露自身，供调用方按具体类型向下转型。
    fn as_any(&self) -> &dyn Any;
}
