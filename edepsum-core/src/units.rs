//! Unit scale factors.
//!
//! Canonical internal units are the millimetre, the nanosecond and the
//! MeV; every other unit is a multiple of those. Quantities are plain
//! `f64` values, so `2.5 * units::CM` reads the way the upstream
//! transport engine writes lengths.

/// Millimetre (canonical length unit).
pub const MM: f64 = 1.0;
/// Centimetre.
pub const CM: f64 = 10.0 * MM;
/// Metre.
pub const M: f64 = 1000.0 * MM;

/// Nanosecond (canonical time unit).
pub const NS: f64 = 1.0;

/// MeV (canonical energy unit).
pub const MEV: f64 = 1.0;
/// keV.
pub const KEV: f64 = 1e-3 * MEV;
/// Electron-volt.
pub const EV: f64 = 1e-6 * MEV;
