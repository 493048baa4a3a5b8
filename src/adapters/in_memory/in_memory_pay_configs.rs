// In memory implementation of the PayConfigSource port.

use crate::core::pay_config::PayConfig;
use crate::core::ports::PayConfigSource;
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Default)]
pub struct InMemoryPayConfigs {
    configs: RwLock<HashMap<String, PayConfig>>,
}

impl InMemoryPayConfigs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, worker_id: impl Into<String>, config: PayConfig) {
        self.configs
            .write()
            .expect("pay config lock poisoned")
            .insert(worker_id.into(), config);
    }
}

impl PayConfigSource for InMemoryPayConfigs {
    fn pay_config(&self, worker_id: &str) -> Option<PayConfig> {
        self.configs
            .read()
            .expect("pay config lock poisoned")
            .get(worker_id)
            .cloned()
    }
}

#[cfg(test)]
mod in_memory_pay_configs_tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn it_should_store_and_return_a_config_per_worker() {
        let configs = InMemoryPayConfigs::new();
        configs.insert("worker-0001", PayConfig::hourly(1200));

        assert_eq!(
            configs.pay_config("worker-0001").map(|c| c.hourly_wage),
            Some(1200)
        );
        assert!(configs.pay_config("worker-0002").is_none());
    }
}
