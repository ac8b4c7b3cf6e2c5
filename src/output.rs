//! Per-rank binary state dumps
//!
//! Writes the flat single-precision time-series files consumed by the
//! downstream format converters: one file per field per rank, one record
//! appended per dump. Record sizes are element count times component
//! count; the stress record carries all six Voigt components of every
//! sub-tetrahedron (`6 × 10` floats per element). Values are truncated
//! from `f64` to `f32` on write, preserving the historical file layout.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::mesh::LocalBlock;

/// Appending writer for one rank's output files
pub struct StateWriter {
    dir: PathBuf,
    rank: usize,
}

impl StateWriter {
    /// Files are created lazily under `dir`, named `<field>.<rank>`
    pub fn new<P: AsRef<Path>>(dir: P, rank: usize) -> Result<Self> {
        std::fs::create_dir_all(dir.as_ref())?;
        Ok(Self { dir: dir.as_ref().to_path_buf(), rank })
    }

    fn open(&self, field: &str) -> Result<BufWriter<File>> {
        let path = self.dir.join(format!("{}.{}", field, self.rank));
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(BufWriter::new(file))
    }

    /// Append one stress record: every tetrahedron's six Voigt components
    /// for every element, in element order
    ///
    /// Refuses to write when any component is NaN or Inf; a poisoned stress
    /// state would otherwise propagate silently into the converters.
    pub fn write_stress(&self, block: &LocalBlock) -> Result<()> {
        for (e_idx, element) in block.elements.iter().enumerate() {
            for (t_idx, tetra) in element.tetra.iter().enumerate() {
                if tetra.stress.iter().any(|s| !s.is_finite()) {
                    return Err(Error::NonFiniteStress { element: e_idx, tetra: t_idx });
                }
            }
        }
        let mut out = self.open("stress")?;
        for element in &block.elements {
            for tetra in &element.tetra {
                for &component in tetra.stress.iter() {
                    out.write_all(&(component as f32).to_le_bytes())?;
                }
            }
        }
        out.flush()?;
        Ok(())
    }

    /// Append one hydrostatic-pressure record: one float per element
    pub fn write_hydro_pressure(&self, block: &LocalBlock) -> Result<()> {
        let mut out = self.open("hydroPressure")?;
        for element in &block.elements {
            out.write_all(&(element.hydro_pressure as f32).to_le_bytes())?;
        }
        out.flush()?;
        Ok(())
    }

    /// Append one plastic-strain record: volume-averaged `aps` per element
    pub fn write_plastic_strain(&self, block: &LocalBlock) -> Result<()> {
        let mut out = self.open("plStrain")?;
        for element in &block.elements {
            out.write_all(&(element.aps as f32).to_le_bytes())?;
        }
        out.flush()?;
        Ok(())
    }
}
