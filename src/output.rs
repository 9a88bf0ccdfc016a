use crate::histogram::Results;
use std::fs::File;
use std::io::prelude::*;
use std::io::BufWriter;
use std::path::Path;

fn write_section<W: Write>(out: &mut W, header: &str, step: f64, values: &[f64]) -> std::io::Result<()> {
    writeln!(out, "{}", header)?;
    for (bin, value) in values.iter().enumerate() {
        writeln!(out, "{:.6e}\t{:.6e}", (bin as f64 + 0.5) * step, value)?;
    }
    writeln!(out)
}

/// One line per radius bin, the columns running over the second axis.
fn write_grid<W: Write>(out: &mut W, header: &str, columns: usize, values: &[f64]) -> std::io::Result<()> {
    writeln!(out, "{}", header)?;
    for row in values.chunks(columns) {
        let line: Vec<String> = row.iter().map(|v| format!("{:.6e}", v)).collect();
        writeln!(out, "{}", line.join("\t"))?;
    }
    writeln!(out)
}

/// Write totals and the 1D distributions of a run as tab separated text. Every distribution is
/// preceded by a `#` header naming the bin centre and the quantity. With `grids` the 2D arrays
/// follow, rows indexed by radius.
pub fn write_results<W: Write>(results: &Results, out: &mut W, grids: bool) -> std::io::Result<()> {
    let grid = &results.grid;
    writeln!(out, "# photons\t{}", results.num_photons)?;
    writeln!(out, "# Rsp\t{:.6e}", results.rsp)?;
    writeln!(out, "# Rd\t{:.6e}", results.rd)?;
    writeln!(out, "# A\t{:.6e}", results.a)?;
    writeln!(out, "# Tt\t{:.6e}", results.tt)?;
    writeln!(out)?;

    writeln!(out, "#layer\tA_l")?;
    for (layer, a) in results.a_l.iter().enumerate().skip(1).take(results.a_l.len() - 2) {
        writeln!(out, "{}\t{:.6e}", layer, a)?;
    }
    writeln!(out)?;

    write_section(out, "#r[cm]\tRd_r[1/cm2]", grid.dr, &results.rd_r)?;
    write_section(out, "#a[rad]\tRd_a[1/sr]", grid.da, &results.rd_a)?;
    write_section(out, "#z[cm]\tA_z[1/cm]", grid.dz, &results.a_z)?;
    write_section(out, "#r[cm]\tTt_r[1/cm2]", grid.dr, &results.tt_r)?;
    write_section(out, "#a[rad]\tTt_a[1/sr]", grid.da, &results.tt_a)?;

    if grids {
        write_grid(out, "#A_rz[1/cm3]\trows r, columns z", grid.nz, &results.a_rz)?;
        write_grid(out, "#Rd_ra[1/(cm2 sr)]\trows r, columns a", grid.na, &results.rd_ra)?;
        write_grid(out, "#Tt_ra[1/(cm2 sr)]\trows r, columns a", grid.na, &results.tt_ra)?;
    }
    Ok(())
}

pub fn save_results_to_file<P: AsRef<Path>>(results: &Results, filename: P, grids: bool) -> std::io::Result<()> {
    let path = filename.as_ref();
    log::info!("Saving results to {}", path.display());
    let mut file = BufWriter::new(File::create(path)?);
    write_results(results, &mut file, grids)?;
    file.flush()
}
