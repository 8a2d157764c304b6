use std::fmt::{self, Display};

/// Target architecture recorded in the COFF file header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MachineType {
    X86,
    Itanium,
    X64,
    Unknown(u16),
}

impl MachineType {
    pub const I386: u16 = 0x014c;
    pub const IA64: u16 = 0x0200;
    pub const AMD64: u16 = 0x8664;

    pub fn code(self) -> u16 {
        match self {
            MachineType::X86 => MachineType::I386,
            MachineType::Itanium => MachineType::IA64,
            MachineType::X64 => MachineType::AMD64,
            MachineType::Unknown(code) => code,
        }
    }

    /// Name printed for the architecture, `None` when it is not one we report.
    pub fn name(self) -> Option<&'static str> {
        match self {
            MachineType::X86 => Some("x86"),
            MachineType::Itanium => Some("Intel Itanium"),
            MachineType::X64 => Some("x64"),
            MachineType::Unknown(_) => None,
        }
    }
}

impl From<u16> for MachineType {
    fn from(code: u16) -> Self {
        match code {
            MachineType::I386 => MachineType::X86,
            MachineType::IA64 => MachineType::Itanium,
            MachineType::AMD64 => MachineType::X64,
            code => MachineType::Unknown(code),
        }
    }
}

impl Display for MachineType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(formatter, "{}", name),
            None => write!(formatter, "unknown ({:#06x})", self.code()),
        }
    }
}
