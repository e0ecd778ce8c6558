//! Header pin to port/shift lookup for the NanoPi M1.
//!
//! The 40-pin header is numbered physically (1..=40). Each wired pin sits on
//! one H3 port (A=0 .. G=6) at a bit position ("shift") within that port's
//! registers. Power and ground pins, and anything past the header, are
//! [`UNMAPPED`].

/// Number of entries in each lookup table.
pub const PIN_COUNT: usize = 64;

/// Sentinel for "no port" / "no shift".
pub const UNMAPPED: i8 = -1;

/// Number of port register blocks (A through G) covered by the mapping.
pub const PORT_COUNT: usize = 7;

/// Port letter names, indexed by port number.
pub const PORT_NAMES: [char; PORT_COUNT] = ['A', 'B', 'C', 'D', 'E', 'F', 'G'];

#[rustfmt::skip]
static PIN_TO_PORT: [i8; PIN_COUNT] = [
//   0   1   2   3   4   5   6   7   8   9
    -1, -1, -1, -1, -1, -1, -1,  6,  6, -1, // 0
     6,  0,  0,  0, -1,  0,  6, -1,  6,  2, // 1
    -1,  2,  0,  2,  2, -1,  0,  0,  0,  0, // 2
    -1,  0,  0,  0, -1,  0,  0,  0,  0, -1, // 3
     0, -1, -1, -1, -1, -1, -1, -1, -1, -1, // 4
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, // 5
    -1, -1, -1, -1,
];

#[rustfmt::skip]
static PIN_TO_SHIFT: [i8; PIN_COUNT] = [
//   0   1   2   3   4   5   6   7   8   9
    -1, -1, -1, -1, -1, -1, -1, 11,  6, -1, // 0
     7,  0,  6,  2, -1,  3,  8, -1,  9,  0, // 1
    -1,  1,  1, 29,  3, -1, 17, 19, 18, 20, // 2
    -1, 21,  7,  8, -1, 16, 13,  9, 15, -1, // 3
    14, -1, -1, -1, -1, -1, -1, -1, -1, -1, // 4
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, // 5
    -1, -1, -1, -1,
];

/// Where a header pin lives in the register bank.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PinLocation {
    /// Port index (0 = PA).
    pub port: usize,
    /// Bit position within the port.
    pub shift: u8,
}

impl PinLocation {
    /// Port letter, e.g. `'A'`. `'?'` for a port index past PG.
    pub fn port_name(&self) -> char {
        PORT_NAMES.get(self.port).copied().unwrap_or('?')
    }
}

impl core::fmt::Display for PinLocation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "P{}{}", self.port_name(), self.shift)
    }
}

/// Resolve a header pin to its port and shift.
///
/// Returns `None` for pins outside `0..64` and for pins marked unmapped in
/// either table. Pure and total.
///
/// ```
/// use m1_car::gpio::resolve;
///
/// let loc = resolve(11).unwrap();
/// assert_eq!((loc.port, loc.shift), (0, 0));
/// assert_eq!(loc.to_string(), "PA0");
///
/// assert!(resolve(1).is_none()); // 3.3V
/// assert!(resolve(-1).is_none());
/// assert!(resolve(64).is_none());
/// ```
pub fn resolve(pin: i32) -> Option<PinLocation> {
    let index = usize::try_from(pin).ok().filter(|&i| i < PIN_COUNT)?;
    let port = PIN_TO_PORT[index];
    let shift = PIN_TO_SHIFT[index];
    if port == UNMAPPED || shift == UNMAPPED {
        return None;
    }
    Some(PinLocation {
        port: port as usize,
        shift: shift as u8,
    })
}

/// Iterator over every header pin that resolves to a location.
pub fn mapped_pins() -> impl Iterator<Item = (i32, PinLocation)> {
    (0..PIN_COUNT as i32).filter_map(|pin| resolve(pin).map(|loc| (pin, loc)))
}
