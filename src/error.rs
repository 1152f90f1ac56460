use std::path::PathBuf;

/// 写入数据文件时可能出现的错误
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("无法获取用户数据目录")]
    DataDir,

    #[error("无法创建目录 {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("写入 {path} 失败: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("序列化失败: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// 读取配置时可能出现的错误
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("读取配置文件 {path} 失败: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("配置文件 TOML 格式错误: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("配置校验失败: {0}")]
    Validation(String),
}

/// 程序入口处汇总的错误
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("日志初始化失败: {0}")]
    Logging(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::Write {
            path: PathBuf::from("db.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "写入 db.json 失败: denied");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("log_filter 不能为空".to_string());
        assert_eq!(err.to_string(), "配置校验失败: log_filter 不能为空");
    }

    #[test]
    fn test_app_error_is_transparent_for_config() {
        let err: AppError = ConfigError::Validation("x".into()).into();
        assert_eq!(err.to_string(), "配置校验失败: x");
    }
}
