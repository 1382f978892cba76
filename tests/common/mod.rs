//! Runs tests using actual binary, apapted from 'fd' method: https://github.com/sharkdp/fd/blob/master/tests/testenv/mod.rs
#![allow(dead_code)]
use std::env;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;
use std::process;

/// Output of lsusb on a Linux machine
pub const LSUSB_OUTPUT: &str = "./tests/data/lsusb_list.txt";
/// Config which changes nothing so tests do not pick up a system config
pub const EMPTY_CONFIG: &str = "./tests/data/empty_config.json";
/// Config which replaces lsusb with `cat` of [`LSUSB_OUTPUT`]
pub const CAT_CONFIG: &str = "./tests/data/cat_config.json";

pub fn read_dump(file_name: &str) -> BufReader<File> {
    let f = File::open(file_name).expect("Unable to open dump file");
    BufReader::new(f)
}

pub fn read_dump_to_string(file_name: &str) -> String {
    let mut ret = String::new();
    let mut br = read_dump(file_name);
    br.read_to_string(&mut ret)
        .unwrap_or_else(|_| panic!("Failed to read {}", file_name));
    ret
}

/// Environment for the integration tests.
pub struct TestEnv {
    /// Path to the *usbscan* executable.
    usbscan_exe: PathBuf,
    /// Config file passed with `--config`
    config: String,
}

/// Find the *usbscan* executable.
fn find_usbscan_exe() -> PathBuf {
    // Tests exe is in target/debug/deps, the *usbscan* exe is in target/debug
    let root = env::current_exe()
        .expect("tests executable")
        .parent()
        .expect("tests executable directory")
        .parent()
        .expect("usbscan executable directory")
        .to_path_buf();

    let exe_name = if cfg!(windows) {
        "usbscan.exe"
    } else {
        "usbscan"
    };

    root.join(exe_name)
}

/// Format an error message for when *usbscan* did not exit successfully.
fn format_exit_error(args: &[&str], output: &process::Output) -> String {
    format!(
        "`usbscan {}` did not exit successfully.\nstdout:\n---\n{}---\nstderr:\n---\n{}---",
        args.join(" "),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

/// Format an error message for when the output of *usbscan* did not match the expected output.
pub fn format_output_error(args: &[&str], expected: &str, actual: &str) -> String {
    // Generate diff text.
    let diff_text = diff::lines(expected, actual)
        .into_iter()
        .map(|diff| match diff {
            diff::Result::Left(l) => format!("-{}", l),
            diff::Result::Both(l, _) => format!(" {}", l),
            diff::Result::Right(r) => format!("+{}", r),
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        concat!(
            "`usbscan {}` did not produce the expected output.\n",
            "Showing diff between expected and actual:\n{}\n"
        ),
        args.join(" "),
        diff_text
    )
}

impl TestEnv {
    pub fn new() -> TestEnv {
        TestEnv {
            usbscan_exe: find_usbscan_exe(),
            config: EMPTY_CONFIG.to_string(),
        }
    }

    /// Use `config` rather than [`EMPTY_CONFIG`]
    pub fn with_config(self, config: &str) -> TestEnv {
        TestEnv {
            usbscan_exe: self.usbscan_exe,
            config: config.to_string(),
        }
    }

    /// Get the path of the usbscan executable.
    pub fn test_exe(&self) -> &PathBuf {
        &self.usbscan_exe
    }

    fn run(&self, args: &[&str]) -> process::Output {
        process::Command::new(&self.usbscan_exe)
            .env("NO_COLOR", "1")
            .arg("--config")
            .arg(&self.config)
            .args(args)
            .output()
            .expect("usbscan output")
    }

    /// Assert that calling *usbscan* with the specified arguments succeeds and return the output
    pub fn assert_success_and_get_output(&self, args: &[&str]) -> process::Output {
        let output = self.run(args);

        if !output.status.success() {
            panic!("{}", format_exit_error(args, &output));
        }

        output
    }

    /// Assert that calling *usbscan* with the specified arguments produces exactly the expected output.
    pub fn assert_output(&self, args: &[&str], expected: &str) {
        let output = self.assert_success_and_get_output(args);
        let actual = String::from_utf8_lossy(&output.stdout);

        if expected != actual {
            panic!("{}", format_output_error(args, expected, &actual));
        }
    }

    /// Assert that calling *usbscan* with the specified arguments fails, prints nothing to stdout and
    /// stderr contains `expected`.
    pub fn assert_failure_with_error(&self, args: &[&str], expected: &str) {
        let output = self.run(args);

        if output.status.success() {
            panic!("error '{}' did not occur.", expected);
        }

        if !output.stdout.is_empty() {
            panic!("{}", format_exit_error(args, &output));
        }

        let actual_err = String::from_utf8_lossy(&output.stderr);
        if !actual_err.contains(expected) {
            panic!("{}", format_output_error(args, expected, &actual_err));
        }
    }
}
