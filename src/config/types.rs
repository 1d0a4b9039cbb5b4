use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::device::constants::{SERIAL_CHARACTERISTIC, SERIAL_SERVICE};

/// Which BLE service/characteristic carries the serial stream. Defaults match HM-10 style
/// modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SerialConfig {
    pub service_uuid: Uuid,
    pub characteristic_uuid: Uuid,
    pub write_with_response: bool,
}

impl Default for SerialConfig {
    fn default() -> Self {
        SerialConfig {
            service_uuid: SERIAL_SERVICE,
            characteristic_uuid: SERIAL_CHARACTERISTIC,
            write_with_response: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub serial: SerialConfig,
}
