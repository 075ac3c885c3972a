//! Stratosat-TK1 housekeeping telemetry.
//!
//! Telemetry frames are recognised by their AX.25 destination prefix. The
//! field table starts 16 bytes into the frame; all values are little-endian
//! raw ADC counts scaled to physical units here.

use std::fmt;
use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use crate::protocol::FrameRecord;
use crate::protocol::constants::{TELEMETRY_FIELDS_LEN, TELEMETRY_FIELDS_OFFSET, TELEMETRY_MARKER};

/// Scale factors, raw count to unit.
const CURRENT_SCALE: f64 = 0.0000766;
const PANEL_CURRENT_SCALE: f64 = 0.00003076;
const CELL_VOLTAGE_SCALE: f64 = 0.00006928;
const BUS_VOLTAGE_SCALE: f64 = 0.00013856;
const CPU_SCALE: f64 = 0.390625;

/// Reboot counters count down from these values.
const OBC_REBOOT_BASE: i32 = 7476;
const COMMU_REBOOT_BASE: i32 = 1505;
const RSSI_OFFSET: i16 = 99;

#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Frame too short: {actual} digits, need {expected}")]
    FrameTooShort { expected: usize, actual: usize },
    #[error("Frame contains invalid hex")]
    InvalidHex,
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(u32),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Panel and battery temperatures in °C.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Temperatures {
    pub x_pos: i8,
    pub x_neg: i8,
    pub y_pos: i8,
    pub y_neg: i8,
    /// No sensor fitted on Z+, value is meaningless
    pub z_pos: i8,
    pub z_neg: i8,
    pub battery1: i8,
    pub battery2: i8,
}

/// One decoded housekeeping frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryRecord {
    pub time: DateTime<Utc>,
    /// Total current, A
    pub total_current: f64,
    /// Current from solar panels, A
    pub panel_current: f64,
    /// Single battery voltage, V
    pub cell_voltage: f64,
    /// Total battery voltage, V
    pub bus_voltage: f64,
    /// Charging current amount, A
    pub charge_current: f64,
    /// Consumption current amount, A
    pub consumption_current: f64,
    pub temperatures: Temperatures,
    pub orientation_working: bool,
    /// CPU usage, %
    pub cpu_load: f64,
    pub obc_reboots: i32,
    pub commu_reboots: i32,
    pub rssi: i16,
    pub packets_rx: u16,
    pub packets_tx: u16,
}

/// Whether a record is a housekeeping frame.
pub fn is_telemetry_frame(record: &FrameRecord) -> bool {
    record.has_bytes_at(0, &TELEMETRY_MARKER)
}

impl TelemetryRecord {
    /// Decode the field table of a telemetry frame.
    ///
    /// The destination prefix is not checked; see [`is_telemetry_frame`].
    pub fn decode(record: &FrameRecord) -> Result<Self, TelemetryError> {
        let start = TELEMETRY_FIELDS_OFFSET * 2;
        let needed = start + TELEMETRY_FIELDS_LEN * 2;
        if record.len() < needed {
            return Err(TelemetryError::FrameTooShort {
                expected: needed,
                actual: record.len(),
            });
        }
        let fields = record
            .bytes_at(start, TELEMETRY_FIELDS_LEN)
            .ok_or(TelemetryError::InvalidHex)?;

        let mut c = Cursor::new(fields);
        let secs = c.read_u32::<LittleEndian>()?;
        let time = DateTime::from_timestamp(i64::from(secs), 0)
            .ok_or(TelemetryError::InvalidTimestamp(secs))?;
        let total_current = f64::from(c.read_u16::<LittleEndian>()?) * CURRENT_SCALE;
        let panel_current = f64::from(c.read_u16::<LittleEndian>()?) * PANEL_CURRENT_SCALE;
        let cell_voltage = f64::from(c.read_u16::<LittleEndian>()?) * CELL_VOLTAGE_SCALE;
        let bus_voltage = f64::from(c.read_u16::<LittleEndian>()?) * BUS_VOLTAGE_SCALE;
        let charge_current = f64::from(c.read_u32::<LittleEndian>()?) * PANEL_CURRENT_SCALE;
        let consumption_current = f64::from(c.read_u32::<LittleEndian>()?) * CURRENT_SCALE;
        let temperatures = Temperatures {
            x_pos: c.read_i8()?,
            x_neg: c.read_i8()?,
            y_pos: c.read_i8()?,
            y_neg: c.read_i8()?,
            z_pos: c.read_i8()?,
            z_neg: c.read_i8()?,
            battery1: c.read_i8()?,
            battery2: c.read_i8()?,
        };
        let orientation_working = c.read_u8()? == 1;
        let cpu_load = f64::from(c.read_u8()?) * CPU_SCALE;
        let obc_reboots = OBC_REBOOT_BASE - i32::from(c.read_u16::<LittleEndian>()?);
        let commu_reboots = COMMU_REBOOT_BASE - i32::from(c.read_u16::<LittleEndian>()?);
        let rssi = i16::from(c.read_i8()?) - RSSI_OFFSET;
        let packets_rx = c.read_u16::<LittleEndian>()?;
        let packets_tx = c.read_u16::<LittleEndian>()?;

        Ok(Self {
            time,
            total_current,
            panel_current,
            cell_voltage,
            bus_voltage,
            charge_current,
            consumption_current,
            temperatures,
            orientation_working,
            cpu_load,
            obc_reboots,
            commu_reboots,
            rssi,
            packets_rx,
            packets_tx,
        })
    }
}

/// Decode every telemetry frame in `records`, skipping broken ones.
pub fn decode_all(records: &[FrameRecord]) -> Vec<TelemetryRecord> {
    records
        .iter()
        .enumerate()
        .filter(|(_, record)| is_telemetry_frame(record))
        .filter_map(|(index, record)| match TelemetryRecord::decode(record) {
            Ok(telemetry) => Some(telemetry),
            Err(e) => {
                debug!(index, error = %e, "Telemetry frame skipped");
                None
            }
        })
        .collect()
}

/// Value rounded to two decimals, printed with the shortest text that
/// round-trips, so `2.0` stays `2.0` and `0.766` becomes `0.77`.
struct Rounded(f64);

impl fmt::Display for Rounded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", (self.0 * 100.0).round() / 100.0)
    }
}

impl fmt::Display for TelemetryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = &self.temperatures;
        writeln!(f, "{}", "-".repeat(50))?;
        writeln!(f, "Time (UTC): {}", self.time.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(f, "Total current: {} A", Rounded(self.total_current))?;
        writeln!(f, "Current from panels: {} A", Rounded(self.panel_current))?;
        writeln!(f, "Voltage from one battery: {} V", Rounded(self.cell_voltage))?;
        writeln!(f, "Total voltage: {} V", Rounded(self.bus_voltage))?;
        writeln!(f, "Charging current amount: {} A", Rounded(self.charge_current))?;
        writeln!(f, "Amount of current consumption: {} A", Rounded(self.consumption_current))?;
        writeln!(f, "Temperature on X+ panel: {} C", t.x_pos)?;
        writeln!(f, "Temperature on X- panel: {} C", t.x_neg)?;
        writeln!(f, "Temperature on Y+ panel: {} C", t.y_pos)?;
        writeln!(f, "Temperature on Y- panel: {} C", t.y_neg)?;
        writeln!(f, "Temperature on Z+ panel: {} C (NONE)", t.z_pos)?;
        writeln!(f, "Temperature on Z- panel: {} C", t.z_neg)?;
        writeln!(f, "Temperature on battery 1: {} C", t.battery1)?;
        writeln!(f, "Temperature on battery 2: {} C", t.battery2)?;
        writeln!(
            f,
            "Orientation state: {}",
            if self.orientation_working {
                "Working"
            } else {
                "Not working"
            }
        )?;
        writeln!(f, "CPU usage: {} %", Rounded(self.cpu_load))?;
        writeln!(f, "OBC reboots: {}", self.obc_reboots)?;
        writeln!(f, "CommU reboots: {}", self.commu_reboots)?;
        writeln!(f, "RSSI: {}", self.rssi)?;
        writeln!(f, "Number of received packets: {}", self.packets_rx)?;
        writeln!(f, "Number of transmitted packets: {}", self.packets_tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame() -> FrameRecord {
        let mut bytes = TELEMETRY_MARKER.to_vec();
        bytes.resize(TELEMETRY_FIELDS_OFFSET, 0x60);
        bytes.extend(1_700_000_000u32.to_le_bytes());
        bytes.extend(10_000u16.to_le_bytes()); // total current
        bytes.extend(20_000u16.to_le_bytes()); // panel current
        bytes.extend(60_000u16.to_le_bytes()); // cell voltage
        bytes.extend(60_000u16.to_le_bytes()); // bus voltage
        bytes.extend(100_000u32.to_le_bytes()); // charge
        bytes.extend(200_000u32.to_le_bytes()); // consumption
        bytes.extend([21u8, 20, 19, 18, 0, 0xF6, 15, 16]); // Z- is -10
        bytes.push(1); // orientation
        bytes.push(128); // cpu
        bytes.extend(7470u16.to_le_bytes());
        bytes.extend(1500u16.to_le_bytes());
        bytes.push(0xA6); // -90
        bytes.extend(1234u16.to_le_bytes());
        bytes.extend(4321u16.to_le_bytes());
        bytes.resize(64, 0);
        FrameRecord::from_bytes(&bytes)
    }

    #[test]
    fn test_decode_fields() {
        let record = sample_frame();
        assert!(is_telemetry_frame(&record));

        let tm = TelemetryRecord::decode(&record).unwrap();
        assert_eq!(tm.time.timestamp(), 1_700_000_000);
        assert!((tm.total_current - 0.766).abs() < 1e-9);
        assert!((tm.panel_current - 0.6152).abs() < 1e-9);
        assert!((tm.cell_voltage - 4.1568).abs() < 1e-9);
        assert!((tm.bus_voltage - 8.3136).abs() < 1e-9);
        assert!((tm.charge_current - 3.076).abs() < 1e-9);
        assert!((tm.consumption_current - 15.32).abs() < 1e-9);
        assert_eq!(tm.temperatures.x_pos, 21);
        assert_eq!(tm.temperatures.z_neg, -10);
        assert!(tm.orientation_working);
        assert!((tm.cpu_load - 50.0).abs() < 1e-9);
        assert_eq!(tm.obc_reboots, 6);
        assert_eq!(tm.commu_reboots, 5);
        assert_eq!(tm.rssi, -189);
        assert_eq!(tm.packets_rx, 1234);
        assert_eq!(tm.packets_tx, 4321);
    }

    #[test]
    fn test_report_text() {
        let report = TelemetryRecord::decode(&sample_frame()).unwrap().to_string();
        assert!(report.contains("Time (UTC): 2023-11-14 22:13:20"));
        assert!(report.contains("Total voltage: 8.31 V"));
        assert!(report.contains("Total current: 0.77 A"));
        assert!(report.contains("Amount of current consumption: 15.32 A"));
        assert!(report.contains("CPU usage: 50.0 %"));
        assert!(report.contains("Temperature on Z+ panel: 0 C (NONE)"));
        assert!(report.contains("Orientation state: Working"));
        assert!(report.ends_with("Number of transmitted packets: 4321\n"));
    }

    #[test]
    fn test_rounded_keeps_short_form() {
        assert_eq!(Rounded(2.0).to_string(), "2.0");
        assert_eq!(Rounded(0.766).to_string(), "0.77");
        assert_eq!(Rounded(4.1568).to_string(), "4.16");
        assert_eq!(Rounded(0.0).to_string(), "0.0");
    }

    #[test]
    fn test_uppercase_marker_matches() {
        let record = FrameRecord::new(sample_frame().as_str().to_uppercase());
        assert!(is_telemetry_frame(&record));
        assert_eq!(decode_all(&[record]).len(), 1);
    }

    #[test]
    fn test_short_frame_skipped() {
        let short = FrameRecord::new("848a82869e9c0000");
        assert!(matches!(
            TelemetryRecord::decode(&short),
            Err(TelemetryError::FrameTooShort { .. })
        ));
        assert!(decode_all(&[short]).is_empty());
    }
}
