use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub database: u8,
}

impl RedisConfig {
    pub fn connection_string(&self) -> String {
        match &self.password {
            Some(password) => format!("redis://:{}@{}:{}/{}", password, self.host, self.port, self.database),
            None => format!("redis://{}:{}/{}", self.host, self.port, self.database),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redis_connection_string() {
        let mut config = RedisConfig {
            host: "localhost".to_string(),
            port: 6379,
            password: None,
            database: 2,
        };
        assert_eq!(config.connection_string(), "redis://localhost:6379/2");

        config.password = Some("hunter2".to_string());
        assert_eq!(config.connection_string(), "redis://:hunter2@localhost:6379/2");
    }

    #[test]
    fn test_bind_address() {
        let config = ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8010,
        };
        assert_eq!(config.bind_address(), "0.0.0.0:8010");
    }
}
