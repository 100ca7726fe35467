//! XST project generation.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::device::Device;
use crate::core::source::SourceFile;
use crate::util::fs::write_string;

/// Render the `.prj` project: one `<language> work <path>` line per source.
pub fn render_prj(sources: &[SourceFile]) -> String {
    let mut out = String::new();
    for source in sources {
        out.push_str(&format!(
            "{} work {}\n",
            source.language,
            source.path.display()
        ));
    }
    out
}

/// Render the `.xst` run script.
pub fn render_xst(
    device: &Device,
    include_paths: &[PathBuf],
    build_name: &str,
    xst_opt: &str,
) -> String {
    let mut out = format!(
        "run\n\
         -ifn {build_name}.prj\n\
         -top top\n\
         {xst_opt}\n\
         -ofn {build_name}.ngc\n\
         -p {device}\n"
    );
    for path in include_paths {
        out.push_str(&format!("-vlgincdir {}\n", path.display()));
    }
    out
}

/// Write `<build_name>.prj` and `<build_name>.xst` into `dir`.
///
/// Returns the written file names, in write order.
pub fn write_xst_files(
    dir: &Path,
    device: &Device,
    sources: &[SourceFile],
    include_paths: &[PathBuf],
    build_name: &str,
    xst_opt: &str,
) -> Result<Vec<String>> {
    let prj = format!("{}.prj", build_name);
    write_string(&dir.join(&prj), &render_prj(sources))?;

    let xst = format!("{}.xst", build_name);
    write_string(
        &dir.join(&xst),
        &render_xst(device, include_paths, build_name, xst_opt),
    )?;

    tracing::debug!("wrote {} and {}", prj, xst);
    Ok(vec![prj, xst])
}
