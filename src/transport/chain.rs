use tracing::{debug, warn};

use super::{serves_instance, CommandTransport, TransportError};
use crate::command::{Command, Target};

/// 配置的传输通道, 按顺序尝试直到成功
#[derive(Debug, Default)]
pub struct TransportChain {
    transports: Vec<Box<dyn CommandTransport>>,
}

impl TransportChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, transport: impl CommandTransport + 'static) {
        self.transports.push(Box::new(transport));
    }

    pub fn with(mut self, transport: impl CommandTransport + 'static) -> Self {
        self.push(transport);
        self
    }

    pub fn len(&self) -> usize {
        self.transports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transports.is_empty()
    }

    /// 按顺序探测每个传输通道
    pub fn probe_each(&self) -> Vec<(&str, Result<(), TransportError>)> {
        self.transports
            .iter()
            .map(|transport| {
                let result = transport.probe();
                if let Err(e) = &result {
                    warn!(transport = transport.name(), error = %e, "transport probe failed");
                }
                (transport.name(), result)
            })
            .collect()
    }
}

impl CommandTransport for TransportChain {
    fn name(&self) -> &str {
        "chain"
    }

    fn send(&self, command: &dyn Command, target: &Target, instance: Option<&str>) -> Result<(), TransportError> {
        let mut attempts = 0;
        for transport in &self.transports {
            if !serves_instance(transport.instance(), instance) {
                debug!(
                    transport = transport.name(),
                    instance = instance.unwrap_or_default(),
                    "skipping transport bound to another instance"
                );
                continue;
            }
            attempts += 1;
            match transport.send(command, target, instance) {
                Ok(()) => return Ok(()),
                Err(e) => warn!(
                    transport = transport.name(),
                    command = command.name(),
                    object = %target,
                    error = %e,
                    "command transport failed, trying the next one"
                ),
            }
        }

        if attempts == 0 {
            Err(TransportError::NoTransport)
        } else {
            Err(TransportError::AllTransportsFailed { attempts })
        }
    }

    /// 至少一个传输通道可达时成功
    fn probe(&self) -> Result<(), TransportError> {
        let results = self.probe_each();
        if results.is_empty() {
            return Err(TransportError::NoTransport);
        }
        if results.iter().any(|(_, result)| result.is_ok()) {
            Ok(())
        } else {
            Err(TransportError::AllTransportsFailed { attempts: results.len() })
        }
    }
}
