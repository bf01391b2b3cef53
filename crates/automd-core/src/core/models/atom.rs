use crate::core::utils::identifiers;
use nalgebra::Point3;
use std::fmt;
use std::num::ParseFloatError;

/// Selects which trailing columns an atom record line carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AtomLineVariant {
    /// Identity and coordinates only.
    Plain,
    /// Identity, coordinates and the partial charge in a trailing 10-column field.
    #[default]
    Charged,
}

/// Represents one atom as the preparation steps see it.
///
/// The serial is assigned when the atom is written out, not when it is parsed,
/// so freshly parsed atoms carry a serial of zero until [`Atom::set_serial`] runs.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The atom name (e.g., "CA", "N1", "CL2").
    pub name: String,
    /// The name of the residue this atom belongs to.
    pub residue_name: String,
    /// The residue sequence number.
    pub residue_id: isize,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
    /// The partial atomic charge in elementary charge units.
    pub charge: f64,
    /// The atom serial number used on output.
    pub serial: usize,
}

impl Atom {
    /// Creates a new `Atom` in residue 1 with zero charge and no serial.
    pub fn new(name: &str, residue_name: &str, position: Point3<f64>) -> Self {
        Self {
            name: name.to_string(),
            residue_name: residue_name.to_string(),
            residue_id: 1,
            position,
            charge: 0.0,
            serial: 0,
        }
    }

    /// Creates an `Atom` from raw coordinate text fields.
    ///
    /// # Errors
    ///
    /// Returns the float parse error of the first coordinate that is not a number.
    pub fn from_fields(
        name: &str,
        residue_name: &str,
        x: &str,
        y: &str,
        z: &str,
    ) -> Result<Self, ParseFloatError> {
        let position = Point3::new(x.trim().parse()?, y.trim().parse()?, z.trim().parse()?);
        Ok(Self::new(name, residue_name, position))
    }

    pub fn with_charge(mut self, charge: f64) -> Self {
        self.charge = charge;
        self
    }

    pub fn with_residue_id(mut self, residue_id: isize) -> Self {
        self.residue_id = residue_id;
        self
    }

    pub fn set_position(&mut self, position: Point3<f64>) {
        self.position = position;
    }

    pub fn set_serial(&mut self, serial: usize) {
        self.serial = serial;
    }

    pub fn set_charge(&mut self, charge: f64) {
        self.charge = charge;
    }

    /// Euclidean distance to another atom in Angstroms.
    pub fn distance_to(&self, other: &Atom) -> f64 {
        nalgebra::distance(&self.position, &other.position)
    }

    /// The element class derived from the atom name.
    ///
    /// See [`identifiers::element_class`].
    pub fn element_class(&self) -> &str {
        identifiers::element_class(&self.name)
    }

    /// Serializes the atom as a fixed-width `ATOM` line.
    ///
    /// Serial in columns 7-11, name in 13-16, residue name in 18-20, residue
    /// number in 23-26 and the coordinates in three 8-column fields from column 31.
    /// The charged variant appends the charge in columns 55-64.
    pub fn record_line(&self, variant: AtomLineVariant) -> String {
        let mut line = format!(
            "ATOM  {:>5} {}{:>4}{:>6}{:>12.3}{:>8.3}{:>8.3}",
            self.serial,
            name_field(&self.name),
            self.residue_name,
            self.residue_id,
            self.position.x,
            self.position.y,
            self.position.z,
        );
        if variant == AtomLineVariant::Charged {
            line.push_str(&format!("{:>10.6}", self.charge));
        }
        line
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.record_line(AtomLineVariant::Charged))
    }
}

/// Pads an atom name into the 4-column name field.
///
/// Names shorter than four characters start in the second column of the field,
/// four-character names fill it.
pub(crate) fn name_field(name: &str) -> String {
    if name.chars().count() >= 4 {
        name.to_string()
    } else {
        format!(" {:<3}", name)
    }
}

/// A (name, charge) pair read from a residue template's atom table.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomCharge {
    pub name: String,
    pub charge: f64,
}

impl AtomCharge {
    pub fn new(name: &str, charge: f64) -> Self {
        Self {
            name: name.to_string(),
            charge,
        }
    }
}
