//! 配置校验模块
//!
//! 校验规则：
//! - remote.host 非空且为 http/https 地址
//! - staging.url 使用 redis:// / rediss:// / unix://
//! - key 前缀非空、互不相同、不含 ':' 与通配符
//! - durable.path 非空

use contracts::{ContractError, KeyScheme, RelayConfig};

const STAGING_SCHEMES: [&str; 3] = ["redis://", "rediss://", "unix://"];
const GLOB_META: [char; 5] = ['*', '?', '[', ']', '\\'];

/// 校验 RelayConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &RelayConfig) -> Result<(), ContractError> {
    validate_remote(config)?;
    validate_staging_url(config)?;
    validate_key_prefixes(&config.staging.keys)?;
    validate_durable(config)?;
    Ok(())
}

/// 非致命问题（仅用于提示）
pub fn warnings(config: &RelayConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.dispatch.chunk_size().is_none() {
        warnings.push(format!(
            "dispatch.frequency = {} - every staged grid is sent in a single request",
            config.dispatch.frequency
        ));
    }

    if config.remote.authorization.is_none() {
        warnings.push(
            "remote.authorization is not set - credential refresh is sent without authorization"
                .to_string(),
        );
    }

    warnings
}

/// 校验远端地址
fn validate_remote(config: &RelayConfig) -> Result<(), ContractError> {
    let host = config.remote.host.trim();
    if host.is_empty() {
        return Err(ContractError::config_validation(
            "remote.host",
            "remote host cannot be empty",
        ));
    }
    if !(host.starts_with("http://") || host.starts_with("https://")) {
        return Err(ContractError::config_validation(
            "remote.host",
            format!("remote host must be an http(s) URL, got '{host}'"),
        ));
    }
    Ok(())
}

/// 校验 staging 连接地址
fn validate_staging_url(config: &RelayConfig) -> Result<(), ContractError> {
    let url = &config.staging.url;
    if !STAGING_SCHEMES.iter().any(|scheme| url.starts_with(scheme)) {
        return Err(ContractError::config_validation(
            "staging.url",
            format!("unsupported staging url '{url}', expected one of {STAGING_SCHEMES:?}"),
        ));
    }
    Ok(())
}

/// 校验 key 前缀
fn validate_key_prefixes(keys: &KeyScheme) -> Result<(), ContractError> {
    for (field, prefix) in [
        ("staging.grid_prefix", &keys.grid_prefix),
        ("staging.sensor_prefix", &keys.sensor_prefix),
    ] {
        if prefix.is_empty() {
            return Err(ContractError::config_validation(
                field,
                "key prefix cannot be empty",
            ));
        }
        if prefix.contains(':') || prefix.contains(GLOB_META) {
            return Err(ContractError::config_validation(
                field,
                format!("key prefix '{prefix}' cannot contain ':' or glob characters"),
            ));
        }
    }

    if keys.grid_prefix == keys.sensor_prefix {
        return Err(ContractError::config_validation(
            "staging.grid_prefix / staging.sensor_prefix",
            format!(
                "grid and sensor prefixes must differ, both are '{}'",
                keys.grid_prefix
            ),
        ));
    }

    Ok(())
}

/// 校验 durable 存储路径
fn validate_durable(config: &RelayConfig) -> Result<(), ContractError> {
    if config.durable.path.as_os_str().is_empty() {
        return Err(ContractError::config_validation(
            "durable.path",
            "durable store path cannot be empty",
        ));
    }
    Ok(())
}
