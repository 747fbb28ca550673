use serde_json::Value;
use tracing::trace;

use crate::context::RouterContext;
use crate::error::Result;

/// 读取指定完全限定模块名下的模块数据。
///
/// # 契约说明（What）
/// - 存储归分发器所有，这里只做一次转发：不缓存、不合并、不检查值形态；
/// - 分发器槽位在调用时刻读取，缺失即报配置错误；
/// - 分发器自身的读取失败原样透传。
pub(crate) fn read(ctx: &RouterContext, qualified_name: &str) -> Result<Option<Value>> {
    let dispatcher = ctx.backends().require_dispatcher()?;
    trace!(qualified_name, "reading module data");
    dispatcher.get_data(qualified_name)
}

/// 写入指定完全限定模块名下的模块数据。
pub(crate) fn write(ctx: &RouterContext, qualified_name: &str, value: Value) -> Result<()> {
    let dispatcher = ctx.backends().require_dispatcher()?;
    trace!(qualified_name, "writing module data");
    dispatcher.set_data(qualified_name, value)
}
