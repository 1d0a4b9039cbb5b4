use uuid::Uuid;

/**
 * The BLE service exposed by HM-10 style serial (UART) modules.
 */
pub const SERIAL_SERVICE: Uuid = Uuid::from_u128(0x0000ffe0_0000_1000_8000_00805f9b34fb);

/**
 * The characteristic that carries serial data for HM-10 style modules.
 * Writes to it are forwarded to the module's UART.
 */
pub const SERIAL_CHARACTERISTIC: Uuid = Uuid::from_u128(0x0000ffe1_0000_1000_8000_00805f9b34fb);

/**
 * Name used when a peripheral does not advertise a local name.
 */
pub const UNKNOWN_NAME: &str = "UNKNOWN";
