//! Remote build counter.

use std::sync::Arc;

use tracing::info;

use pipeline::{PublishError, RepositoryVariables, VariableName, VersionCode};

/// The monotonic build counter kept in a repository variable.
///
/// Reading and incrementing are two separate API calls. Two runs started at
/// the same time can read the same value; nothing here prevents that.
#[derive(Clone)]
pub struct VersionCounter {
    variables: Arc<dyn RepositoryVariables>,
    variable: VariableName,
}

impl VersionCounter {
    /// Counter stored in `variable`.
    pub fn new(variables: Arc<dyn RepositoryVariables>, variable: VariableName) -> Self {
        Self {
            variables,
            variable,
        }
    }

    /// Reads the counter, stores `value + 1`, and returns the new value.
    pub async fn read_and_increment(&self) -> Result<VersionCode, PublishError> {
        let raw = self
            .variables
            .get_variable(&self.variable)
            .await
            .map_err(|e| self.read_error(e.to_string()))?;

        let current: VersionCode = raw
            .parse()
            .map_err(|_| self.read_error(format!("value {raw:?} is not an integer")))?;
        let next = current
            .next()
            .ok_or_else(|| self.read_error(format!("value {current} cannot be incremented")))?;

        self.variables
            .update_variable(&self.variable, &next.to_string())
            .await
            .map_err(|e| PublishError::RemoteWrite {
                variable: self.variable.clone(),
                reason: e.to_string(),
            })?;

        info!(variable = %self.variable, previous = %current, current = %next, "build counter incremented");
        Ok(next)
    }

    fn read_error(&self, reason: String) -> PublishError {
        PublishError::RemoteRead {
            variable: self.variable.clone(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pipeline::HostError;
    use std::sync::Mutex;

    struct MemoryVariables {
        value: Mutex<Option<String>>,
        fail_update: bool,
    }

    impl MemoryVariables {
        fn holding(value: &str) -> Arc<Self> {
            Arc::new(Self {
                value: Mutex::new(Some(value.to_string())),
                fail_update: false,
            })
        }
    }

    #[async_trait]
    impl RepositoryVariables for MemoryVariables {
        async fn get_variable(&self, _name: &VariableName) -> Result<String, HostError> {
            self.value.lock().unwrap().clone().ok_or(HostError::Status {
                status: 404,
                body: "Not Found".to_string(),
            })
        }

        async fn update_variable(&self, _name: &VariableName, value: &str) -> Result<(), HostError> {
            if self.fail_update {
                return Err(HostError::Status {
                    status: 403,
                    body: "Resource not accessible".to_string(),
                });
            }
            *self.value.lock().unwrap() = Some(value.to_string());
            Ok(())
        }
    }

    fn counter(store: Arc<MemoryVariables>) -> VersionCounter {
        VersionCounter::new(store, VariableName::new("VERSION_CODE").unwrap())
    }

    #[tokio::test]
    async fn increments_and_stores_next_value() {
        let store = MemoryVariables::holding("40");
        let code = counter(store.clone()).read_and_increment().await.unwrap();
        assert_eq!(code, VersionCode::new(41));
        assert_eq!(store.value.lock().unwrap().as_deref(), Some("41"));
    }

    #[tokio::test]
    async fn missing_variable_is_a_read_error() {
        let store = Arc::new(MemoryVariables {
            value: Mutex::new(None),
            fail_update: false,
        });
        let err = counter(store).read_and_increment().await.unwrap_err();
        assert!(matches!(err, PublishError::RemoteRead { ref reason, .. } if reason.contains("404")));
    }

    #[tokio::test]
    async fn non_integer_value_is_a_read_error_and_not_written() {
        let store = MemoryVariables::holding("forty");
        let err = counter(store.clone()).read_and_increment().await.unwrap_err();
        assert!(matches!(err, PublishError::RemoteRead { .. }));
        assert_eq!(store.value.lock().unwrap().as_deref(), Some("forty"));
    }

    #[tokio::test]
    async fn rejected_update_is_a_write_error() {
        let store = Arc::new(MemoryVariables {
            value: Mutex::new(Some("7".to_string())),
            fail_update: true,
        });
        let err = counter(store).read_and_increment().await.unwrap_err();
        match err {
            PublishError::RemoteWrite { variable, reason } => {
                assert_eq!(variable.as_str(), "VERSION_CODE");
                assert!(reason.contains("403"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
