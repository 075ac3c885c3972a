//! Protocol constants for the supported downlink formats.
//!
//! Offsets are expressed in hex-digit units of a frame record
//! (two digits per byte) unless stated otherwise.

// ============================================================================
// KISS Framing
// ============================================================================

/// Frame delimiter
pub const FEND: u8 = 0xC0;
/// Escape introducer
pub const FESC: u8 = 0xDB;
/// Escaped FEND
pub const TFEND: u8 = 0xDC;
/// Escaped FESC
pub const TFESC: u8 = 0xDD;

/// Type byte of a data frame on port 0. Anything else is a TNC command.
pub const KISS_DATA_FRAME: u8 = 0x00;

// ============================================================================
// JPEG
// ============================================================================

/// JPEG start-of-image marker followed by the first marker prefix.
pub const JPEG_SOI: [u8; 3] = [0xFF, 0xD8, 0xFF];

// ============================================================================
// SIREN (generic image protocol)
// ============================================================================

/// Image data command code
pub const SIREN_IMAGE_CMD: u16 = 0x240C;
/// Command code field
pub const SIREN_CMD_OFFSET: usize = 32;
/// Address field (4 bytes, little-endian)
pub const SIREN_ADDR_OFFSET: usize = 50;
pub const SIREN_ADDR_BYTES: usize = 4;
/// First payload digit
pub const SIREN_PAYLOAD_OFFSET: usize = 58;
/// Nominal payload size in bytes
pub const SIREN_BLOCK_SIZE: u64 = 374;
/// Text lines must be strictly longer than this to carry a command code.
pub const SIREN_MIN_LINE_LEN: usize = 37;

// ============================================================================
// Stratosat-TK1 (length-prefixed image protocol)
// ============================================================================

/// Image data command code
pub const STRATOSAT_IMAGE_CMD: u16 = 0x0200;
/// Command code field
pub const STRATOSAT_CMD_OFFSET: usize = 0;
/// Declared length byte
pub const STRATOSAT_LEN_OFFSET: usize = 4;
/// Resolution flag field (2 bytes)
pub const STRATOSAT_RES_OFFSET: usize = 6;
/// Resolution flag value for high resolution captures
pub const STRATOSAT_HIGH_RES: u16 = 0x2098;
/// Address field (3 bytes, little-endian)
pub const STRATOSAT_ADDR_OFFSET: usize = 10;
pub const STRATOSAT_ADDR_BYTES: usize = 3;
/// First payload digit
pub const STRATOSAT_PAYLOAD_OFFSET: usize = 16;
/// Payload size in bytes of a full frame
pub const STRATOSAT_BLOCK_SIZE: u64 = 56;
/// A 64-byte frame as text
pub const STRATOSAT_LINE_LEN: usize = 128;

// ============================================================================
// Stratosat-TK1 telemetry
// ============================================================================

/// AX.25 destination callsign prefix of housekeeping frames.
pub const TELEMETRY_MARKER: [u8; 6] = [0x84, 0x8A, 0x82, 0x86, 0x9E, 0x9C];
/// Byte offset of the first telemetry field within the frame
pub const TELEMETRY_FIELDS_OFFSET: usize = 16;
/// Bytes covered by the telemetry field table
pub const TELEMETRY_FIELDS_LEN: usize = 39;
