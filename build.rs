#[cfg(feature = "cli_generate")]
#[allow(dead_code)]
mod cli {
    include!("src/cli.rs");
}

#[cfg(feature = "cli_generate")]
fn generate() -> std::io::Result<()> {
    use clap::CommandFactory;
    use clap_complete::generate_to;
    use clap_complete::shells::*;
    use std::fs;
    use std::path::PathBuf;

    let outdir = match std::env::var_os("BUILD_SCRIPT_DIR").or_else(|| std::env::var_os("OUT_DIR")) {
        Some(dir) => dir,
        None => return Ok(()),
    };

    fs::create_dir_all(&outdir)?;

    let mut app = <cli::Args as CommandFactory>::command();

    let bin_name = "usbscan";
    generate_to(Bash, &mut app, bin_name, &outdir)?;
    generate_to(Fish, &mut app, bin_name, &outdir)?;
    generate_to(Zsh, &mut app, bin_name, &outdir)?;
    generate_to(PowerShell, &mut app, bin_name, &outdir)?;

    let man = clap_mangen::Man::new(app);
    let mut buffer: Vec<u8> = Default::default();
    man.render(&mut buffer)?;

    fs::write(PathBuf::from(outdir).join("usbscan.1"), buffer)?;

    Ok(())
}

fn main() -> std::io::Result<()> {
    println!("cargo:rerun-if-changed=src/cli.rs");

    #[cfg(feature = "cli_generate")]
    generate()?;

    Ok(())
}
