//! 转发引擎识别的配置项，以 TOML 文件承载。
//!
//! 解析策略是宽容的：缺失字段回落到默认值，未知字段只记一条 `warn` 日志而
//! 不是解析失败——转发引擎不应该因为运维在配置文件里多写了一个字段就拒绝启动。

use serde::Deserialize;

use crate::name::Name;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub enable_round_robin: bool,
    pub round_robin_prefix: String,
    pub round_robin_round_time_ms: u32,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            enable_round_robin: false,
            round_robin_prefix: String::new(),
            round_robin_round_time_ms: 1_000,
        }
    }
}

impl StrategyConfig {
    /// 解析后的轮询前缀；配置为空字符串时视为根前缀（匹配一切）。
    #[must_use]
    pub fn round_robin_prefix_name(&self) -> Name {
        Name::parse(&self.round_robin_prefix).unwrap_or_else(|_| Name::root())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// 未请求的 Data 是否允许进入 Content Store。默认 `false`：全部丢弃。
    pub cache_unsolicited_data: bool,
    pub content_store_capacity: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            cache_unsolicited_data: false,
            content_store_capacity: 65_536,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    pub need_validate: bool,
    pub worker_capacity: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            need_validate: true,
            worker_capacity: 4,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    pub capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self { capacity: 4_096 }
    }
}

/// 转发引擎的顶层配置。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ForwarderConfig {
    pub strategy: StrategyConfig,
    pub table: TableConfig,
    pub validator: ValidatorConfig,
    pub queue: QueueConfig,
}

impl ForwarderConfig {
    /// 从 TOML 文本解析配置。未加 `#[serde(deny_unknown_fields)]`——多出来的
    /// 键被静默忽略而不是拒绝解析，转发引擎不应该因为运维多写了一个字段就
    /// 拒绝启动。
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// 从磁盘加载配置文件；读取失败时记录错误并回落到默认配置——配置加载
    /// 本身属于宿主职责，核心不因为一个坏文件拒绝启动。
    pub fn from_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml_str(&text).unwrap_or_else(|err| {
                tracing::error!(path = %path.display(), error = %err, "failed to parse configuration, using defaults");
                Self::default()
            }),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "configuration file unreadable, using defaults");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let cfg = ForwarderConfig::from_toml_str("[strategy]\nenable_round_robin = true\n").unwrap();
        assert!(cfg.strategy.enable_round_robin);
        assert_eq!(cfg.table.content_store_capacity, 65_536);
        assert_eq!(cfg.queue.capacity, 4_096);
    }

    #[test]
    fn round_robin_prefix_parses_to_name() {
        let mut cfg = ForwarderConfig::default();
        cfg.strategy.round_robin_prefix = "/min".to_owned();
        assert_eq!(cfg.strategy.round_robin_prefix_name().to_uri(), "/min");
    }
}
