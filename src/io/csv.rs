use std::io::Write;
use std::path::Path;

use crate::dynamics::Dynamics;
use crate::error::{require_len, Result};
use crate::sim::runner::Trajectory;

/// Write a trajectory in CSV format.
///
/// Columns: step, time, then one column per state index named by `labels`.
pub fn write_trajectory<W: Write>(writer: &mut W, labels: &[&str], trajectory: &Trajectory) -> Result<()> {
    require_len("state labels", trajectory.initial().len(), labels.len())?;

    writeln!(writer, "step,time,{}", labels.join(","))?;

    for (k, (state, t)) in trajectory.states().iter().zip(trajectory.times()).enumerate() {
        require_len("trajectory state", labels.len(), state.len())?;
        write!(writer, "{k},{t:.6}")?;
        for v in state.iter() {
            write!(writer, ",{v:.9}")?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

/// Write a trajectory using the model's own state labels.
pub fn write_model_trajectory<W, M>(writer: &mut W, model: &M, trajectory: &Trajectory) -> Result<()>
where
    W: Write,
    M: Dynamics + ?Sized,
{
    write_trajectory(writer, model.state_labels(), trajectory)
}

/// Write a trajectory to a CSV file at the given path.
pub fn write_trajectory_file<P: AsRef<Path>>(path: P, labels: &[&str], trajectory: &Trajectory) -> Result<()> {
    let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
    write_trajectory(&mut file, labels, trajectory)?;
    file.flush()?;
    Ok(())
}
