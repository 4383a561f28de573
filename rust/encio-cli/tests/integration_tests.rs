use std::fs;

use assert_cmd::{cargo::cargo_bin_cmd, Command};
use encio::{resolve::IO_ENCODING_ENV, Channel};
use encio_cli::logging::LOG_ENV;
use predicates::{
    boolean::PredicateBooleanExt,
    ord::eq,
    str::{contains, is_empty, starts_with},
};
use rstest::*;
use tempfile::{tempdir, TempDir};

fn cmd() -> Command {
    let mut cmd = cargo_bin_cmd!("encio");
    // keep the host locale and overrides out of the tests
    for var in Channel::ALL
        .map(|channel| channel.env_var())
        .into_iter()
        .chain(["LC_ALL", "LC_CTYPE", "LANG", IO_ENCODING_ENV, LOG_ENV])
    {
        cmd.env_remove(var);
    }
    cmd
}

#[fixture]
fn output_dir() -> TempDir {
    tempdir().unwrap()
}

#[test]
fn input_arg_to_stdout() {
    cmd()
        .args(["--ia", "héllo wörld"])
        .assert()
        .success()
        .stdout(eq("héllo wörld"))
        .stderr(is_empty());
}

#[test]
fn reads_stdin_without_input_flag() {
    cmd()
        .write_stdin("from stdin\n")
        .assert()
        .success()
        .stdout(eq("from stdin\n"));
}

#[test]
fn stdin_and_stdout_encodings() {
    cmd()
        .args(["--stdie", "shift_jis", "--stdoe", "euc-jp"])
        .write_stdin(b"\x93\xfa\x96\x7b".as_slice())
        .assert()
        .success()
        .stdout(eq(b"\xc6\xfc\xcb\xdc".as_slice()));
}

#[test]
fn stdioe_from_env() {
    cmd()
        .env("ENCIO_IOENCODING", "utf-16le")
        .args(["--ia", "ok"])
        .assert()
        .success()
        .stdout(eq(b"o\0k\0".as_slice()));
}

#[test]
fn stdout_flag_beats_stdioe() {
    cmd()
        .args(["--stdioe", "utf-16le", "--stdoe", "utf-16be", "--ia", "ok"])
        .assert()
        .success()
        .stdout(eq(b"\0o\0k".as_slice()));
}

#[rstest]
fn input_file_with_encoding(output_dir: TempDir) {
    let path = output_dir.path().join("in.txt");
    fs::write(&path, b"\x93\xfa\x96\x7b\x8c\xea").unwrap();
    cmd()
        .args(["--ife", "cp932", "--if"])
        .arg(&path)
        .assert()
        .success()
        .stdout(eq("日本語"));
}

#[rstest]
fn malformed_input_file(output_dir: TempDir) {
    let path = output_dir.path().join("in.txt");
    fs::write(&path, b"\x93\xfa\x96\x7b").unwrap();
    cmd()
        .arg("--if")
        .arg(&path)
        .assert()
        .code(8)
        .stdout(is_empty())
        .stderr(
            starts_with("error: failed to decode input file").and(contains("as UTF-8")),
        )
        .stderr(contains("hint: pass --ife to choose a different input file encoding"));
}

#[test]
fn malformed_stdin() {
    cmd()
        .write_stdin(b"abc\xff".as_slice())
        .assert()
        .code(10)
        .stdout(is_empty())
        .stderr(contains("failed to decode stdin as UTF-8"))
        .stderr(contains("--stdie"));
}

#[cfg(unix)]
#[test]
fn malformed_input_arg() {
    use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

    cmd()
        .arg("--ia")
        .arg(OsStr::from_bytes(b"\x93\xfa"))
        .assert()
        .code(3)
        .stderr(contains("failed to decode the input argument as UTF-8"));
}

#[cfg(unix)]
#[test]
fn input_arg_with_cae() {
    use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

    cmd()
        .args(["--cae", "shift_jis", "--ia"])
        .arg(OsStr::from_bytes(b"\x93\xfa\x96\x7b"))
        .assert()
        .success()
        .stdout(eq("日本"));
}

#[test]
fn missing_input_file() {
    cmd()
        .args(["--if", "./no/such/file.txt"])
        .assert()
        .code(6)
        .stderr(starts_with(
            "error: failed to open input file './no/such/file.txt'",
        ));
}

#[test]
fn unknown_encoding_flag() {
    cmd()
        .args(["--ofe", "klingon", "--ia", "x"])
        .assert()
        .code(2)
        .stdout(is_empty())
        .stderr(contains("unknown output file encoding 'klingon' from flag --ofe"));
}

#[test]
fn unknown_encoding_env() {
    cmd()
        .env("ENCIO_STDOE", "nope")
        .args(["--ia", "x"])
        .assert()
        .code(2)
        .stderr(contains("from env ENCIO_STDOE"));
}

#[test]
fn unencodable_stdout() {
    cmd()
        .args(["--stdoe", "latin1", "--ia", "日本"])
        .assert()
        .code(24)
        .stdout(is_empty())
        .stderr(contains("failed to encode the result as ISO-8859-1"));
}

#[rstest]
#[case("--ofnte", "ab.txt")]
#[case("--ofnts", "a b.txt")]
#[case("--ofntn", "a%3Fb.txt")]
fn escaped_output_file_name(
    output_dir: TempDir,
    #[case] policy: &str,
    #[case] exp_name: &str,
) {
    let path = output_dir.path().join("a?b.txt");
    cmd()
        .args(["--ia", "saved", policy, "--of"])
        .arg(&path)
        .assert()
        .success()
        .stdout(is_empty());
    assert_eq!(
        fs::read_to_string(output_dir.path().join(exp_name)).unwrap(),
        "saved"
    );
}

#[rstest]
fn output_file_encoding(output_dir: TempDir) {
    let path = output_dir.path().join("out.txt");
    cmd()
        .args(["--ia", "日本", "--ofe", "euc-jp", "--of"])
        .arg(&path)
        .assert()
        .success();
    assert_eq!(fs::read(&path).unwrap(), b"\xc6\xfc\xcb\xdc");
}

#[rstest]
fn unencodable_output_file_keeps_existing(output_dir: TempDir) {
    let path = output_dir.path().join("out.txt");
    fs::write(&path, "before").unwrap();
    cmd()
        .args(["--ia", "日本", "--ofe", "latin1", "--of"])
        .arg(&path)
        .assert()
        .code(21);
    assert_eq!(fs::read_to_string(&path).unwrap(), "before");
}

#[test]
fn output_to_nonexistent_dir() {
    cmd()
        .args(["--ia", "x", "--of", "./a/b/c/d/e"])
        .assert()
        .code(22)
        .stderr(contains("failed to open output file './a/b/c/d/e'"));
}

#[rstest]
#[case(&["--ia", "x", "--if", "y"])]
#[case(&["--of", "o", "--ofnte", "--ofnts"])]
#[case(&["--ofntn"])]
#[case(&["--spsep", ","])]
#[case(&["--bogus"])]
fn usage_errors(#[case] args: &[&str]) {
    cmd().args(args).assert().code(1).stdout(is_empty());
}

#[rstest]
#[case("--help")]
#[case("--version")]
fn help_and_version(#[case] flag: &str) {
    cmd().arg(flag).assert().success().stdout(contains("encio"));
}

#[test]
fn encoding_info() {
    cmd()
        .env("LANG", "ja_JP.eucJP")
        .args(["--ei", "--spee", "gbk", "--stdioe", "utf-8", "--ia", "x"])
        .assert()
        .success()
        .stdout(eq("x"))
        .stderr(starts_with("platform:\n  locale: LANG=ja_JP.eucJP (codeset: eucJP)\n"))
        .stderr(contains("  ENCIO_IOENCODING: not set\n"))
        .stderr(contains("(flag --spee)"))
        .stderr(contains("(flag --stdioe)"))
        .stderr(contains("EUC-JP       (locale LANG)"));
}

#[test]
fn debug_shows_detail() {
    cmd()
        .args(["--debug"])
        .write_stdin(b"\xff".as_slice())
        .assert()
        .code(10)
        .stderr(contains("debug: "))
        .stderr(contains("at offset 0"));
}

#[cfg(unix)]
#[test]
fn subprocess_replaces_payload() {
    cmd()
        .args(["--ia", "hello", "--sp", "tr a-z A-Z"])
        .assert()
        .success()
        .stdout(eq("HELLO"));
}

#[cfg(unix)]
#[test]
fn subprocess_with_separator() {
    cmd()
        .args(["--ia", "a b", "--sp", "tr|a b|x_y", "--spsep", "|"])
        .assert()
        .success()
        .stdout(eq("x_y"));
}

#[cfg(unix)]
#[test]
fn subprocess_stdout_decode_failure() {
    cmd()
        .args(["--ia", "日本", "--spie", "shift_jis", "--sp", "cat"])
        .assert()
        .code(18)
        .stderr(contains("failed to decode stdout of subprocess 'cat' as UTF-8"))
        .stderr(contains("hint: pass --spoe"));
}

#[cfg(unix)]
#[test]
fn subprocess_stderr_is_echoed() {
    cmd()
        .args(["--ia", "", "--sp", "ls /encio-no-such-dir"])
        .assert()
        .success()
        .stdout(is_empty())
        .stderr(contains("--- subprocess stderr ---\n"))
        .stderr(contains("--- end of subprocess stderr ---\n"))
        // a failing child only warns
        .stderr(contains("exited with"));
}

#[test]
fn subprocess_missing_program() {
    cmd()
        .args(["--ia", "x", "--sp", "encio-no-such-program"])
        .assert()
        .code(14)
        .stderr(contains("failed to run subprocess 'encio-no-such-program'"));
}

#[test]
fn subprocess_empty_command() {
    cmd()
        .args(["--ia", "x", "--sp", " "])
        .assert()
        .code(14)
        .stderr(contains("no program to run"));
}

#[rstest]
#[case(b"caf\xe9".as_slice(), 10)]
#[case(b"cafe".as_slice(), 0)]
fn ascii_stdin_is_strict(#[case] input: &[u8], #[case] exp_code: i32) {
    cmd()
        .args(["--stdie", "ascii"])
        .write_stdin(input)
        .assert()
        .code(exp_code);
}

#[rstest]
fn ascii_output_file_is_strict(output_dir: TempDir) {
    let path = output_dir.path().join("out.txt");
    cmd()
        .args(["--ia", "café", "--ofe", "ascii", "--of"])
        .arg(&path)
        .assert()
        .code(21)
        .stderr(contains("failed to encode the result as US-ASCII"));
    assert!(!path.exists());
}

#[cfg(target_os = "linux")]
#[rstest]
fn unreadable_input_file(output_dir: TempDir) {
    // opening a directory succeeds on Linux but reading it doesn't
    cmd()
        .arg("--if")
        .arg(output_dir.path())
        .assert()
        .code(7)
        .stderr(contains("failed to read input file"));
}

#[cfg(target_os = "linux")]
#[test]
fn unwritable_output_file() {
    cmd()
        .args(["--ia", "x", "--of", "/dev/full"])
        .assert()
        .code(23)
        .stderr(contains("failed to write output file '/dev/full'"));
}

#[cfg(unix)]
mod raw_bytes {
    use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

    use super::*;

    const MALFORMED: &[u8] = b"\xff\xfe.txt";

    #[test]
    fn malformed_input_file_path() {
        cmd()
            .arg("--if")
            .arg(OsStr::from_bytes(MALFORMED))
            .assert()
            .code(4)
            .stderr(contains("failed to decode input file path"))
            .stderr(contains("hint: pass --cae"));
    }

    #[test]
    fn malformed_subprocess_command() {
        cmd()
            .args(["--ia", "x", "--sp"])
            .arg(OsStr::from_bytes(MALFORMED))
            .assert()
            .code(11)
            .stderr(contains("failed to decode the subprocess command as UTF-8"));
    }

    #[test]
    fn malformed_output_file_path() {
        cmd()
            .args(["--ia", "x", "--of"])
            .arg(OsStr::from_bytes(MALFORMED))
            .assert()
            .code(19)
            .stderr(contains("failed to decode output file path"));
    }
}

#[rstest]
fn unencodable_input_file_path(output_dir: TempDir) {
    cmd()
        .args(["--fse", "latin1", "--if"])
        .arg(output_dir.path().join("日本.txt"))
        .assert()
        .code(5)
        .stderr(contains("failed to encode input file path"))
        .stderr(contains("as ISO-8859-1"))
        .stderr(contains("hint: pass --fse"));
}

#[rstest]
fn unencodable_output_file_path(output_dir: TempDir) {
    cmd()
        .args(["--ia", "x", "--fse", "latin1", "--of"])
        .arg(output_dir.path().join("日本.txt"))
        .assert()
        .code(20)
        .stderr(contains("failed to encode output file path"));
}

#[test]
fn unencodable_subprocess_command() {
    cmd()
        .args(["--ia", "x", "--spce", "latin1", "--sp", "echo 日本"])
        .assert()
        .code(12)
        .stderr(contains("failed to encode subprocess command 'echo 日本' as ISO-8859-1"))
        .stderr(contains("hint: try `--spce UTF-8`"));
}

#[test]
fn unencodable_subprocess_input() {
    cmd()
        .args(["--ia", "日本", "--spie", "latin1", "--sp", "cat"])
        .assert()
        .code(13)
        .stderr(contains("failed to encode the subprocess input as ISO-8859-1"));
}

#[cfg(unix)]
#[test]
fn malformed_subprocess_stderr() {
    cmd()
        .args(["--ia", "x", "--spsep", "|", "--sp", r"sh|-c|printf '\377' >&2"])
        .assert()
        .code(15)
        .stderr(contains("failed to decode stderr of subprocess 'sh' as UTF-8"))
        .stderr(contains("hint: pass --spee"));
}

#[cfg(unix)]
#[test]
fn unencodable_subprocess_stderr() {
    cmd()
        .args(["--ia", "x", "--stdee", "latin1", "--spsep", "|", "--sp", "sh|-c|printf 日本 >&2"])
        .assert()
        .code(16)
        .stderr(contains("failed to encode the subprocess stderr as ISO-8859-1"));
}

#[cfg(unix)]
#[test]
fn log_records_use_stderr_encoding() {
    let output = cmd()
        .args(["--ia", "x", "--stdee", "utf-16le", "--sp", "false"])
        .assert()
        .success()
        .get_output()
        .stderr
        .clone();
    let exp: Vec<u8> = "exited with"
        .encode_utf16()
        .flat_map(u16::to_le_bytes)
        .collect();
    assert!(
        output.windows(exp.len()).any(|window| window == exp.as_slice()),
        "{output:?}"
    );
    // no UTF-8 record mixed in
    assert!(!output.windows(4).any(|window| window == b"WARN"));
}
