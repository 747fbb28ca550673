use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::{RouterError, Result, codes};

/// 保留别名集合：链路保留字与默认命名空间一律不可被自定义注册覆盖。
///
/// `session`、`data`、`http` 是状态机的保留字；`controller`、`model`、`module`
/// 作为出厂默认命名空间同样禁止重映射，否则 `model` 链等特化路径的语义会被破坏。
const RESERVED_ALIASES: &[&str] = &["session", "data", "http", "controller", "model", "module"];

/// 出厂默认命名空间映射。
const DEFAULT_NAMESPACES: &[(&str, &str)] = &[
    ("controller", "Controller"),
    ("model", "Model"),
    ("module", "Module"),
];

/// `NamespaceRegistry` 维护“短别名 → 分发签名后缀”的进程级映射。
///
/// # 设计背景（Why）
/// - 分发签名按 `模块名 + 后缀 + "." + 方法名` 构造；别名把“目标是哪类对象”
///   的选择从签名拼写里解放出来，调用方只需写 `module`、`controller` 这类短词；
/// - 注册表在进程存续期内可随时被显式注册修改（后写覆盖先写），读多写少，
///   用 `parking_lot::RwLock` 承载即可，读路径无分配。
///
/// # 契约说明（What）
/// - **前置条件**：注册发生在进程启动期；运行中途的并发改写不做仲裁（调用方竞态）；
/// - **后置条件**：`resolve` 随时反映最近一次成功注册的结果。
pub struct NamespaceRegistry {
    entries: RwLock<HashMap<String, String>>,
}

impl NamespaceRegistry {
    /// 构造带出厂默认映射的注册表。
    pub fn new() -> Self {
        let entries = DEFAULT_NAMESPACES
            .iter()
            .map(|(alias, suffix)| ((*alias).to_owned(), (*suffix).to_owned()))
            .collect();
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// 注册或覆盖一条自定义别名映射。
    ///
    /// # 契约说明（What）
    /// - **输入**：`alias` 为链路首段使用的短别名，`suffix` 为拼入分发签名的后缀；
    /// - **失败语义**：别名或后缀为空白时返回 [`codes::ALIAS_INVALID`] /
    ///   [`codes::SUFFIX_INVALID`]；别名命中保留字时返回 [`codes::ALIAS_RESERVED`]；
    /// - **后置条件**：成功后立即对所有根对象可见；对同名自定义别名为幂等覆盖。
    pub fn register(&self, alias: &str, suffix: &str) -> Result<()> {
        if alias.trim().is_empty() {
            return Err(RouterError::validation(
                codes::ALIAS_INVALID,
                "namespace alias must be a non-empty string",
            ));
        }
        if suffix.trim().is_empty() {
            return Err(RouterError::validation(
                codes::SUFFIX_INVALID,
                "namespace suffix must be a non-empty string",
            ));
        }
        if RESERVED_ALIASES.contains(&alias) {
            return Err(RouterError::validation(
                codes::ALIAS_RESERVED,
                format!("namespace alias {alias} is reserved"),
            ));
        }
        debug!(alias, suffix, "registering namespace alias");
        self.entries
            .write()
            .insert(alias.to_owned(), suffix.to_owned());
        Ok(())
    }

    /// 解析别名对应的签名后缀；未注册时返回 `None`。
    pub fn resolve(&self, alias: &str) -> Option<String> {
        self.entries.read().get(alias).cloned()
    }

    /// 判断别名是否已注册（含出厂默认）。
    pub fn contains(&self, alias: &str) -> bool {
        self.entries.read().contains_key(alias)
    }

    /// 枚举当前全部别名，便于诊断与文档生成。
    pub fn aliases(&self) -> Vec<String> {
        let mut aliases: Vec<String> = self.entries.read().keys().cloned().collect();
        aliases.sort();
        aliases
    }
}

impl Default for NamespaceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
