//! 命令行集成测试

#[allow(dead_code)]
mod common {
    include!("common/mod.rs");
}

#[cfg(test)]
mod passing {
    use std::fs;

    use assert_cmd::Command;

    use super::common::*;

    #[test]
    fn translate_file_to_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let dictionary = write_dictionary(&dir);
        let input = dir.path().join("issues.html");
        fs::write(
            &input,
            page_html(
                "Issues · octocat/Hello-World",
                Some(REPO_LOCATION),
                "<button>New issue</button>",
            ),
        )
        .unwrap();

        let output = Command::cargo_bin("page-i18n")
            .unwrap()
            .arg("--dictionary")
            .arg(&dictionary)
            .args(["--url", ISSUES_URL])
            .arg(&input)
            .output()
            .unwrap();

        assert!(output.status.success());
        let html = String::from_utf8_lossy(&output.stdout);
        assert!(html.contains("<button>新建议题</button>"));
        assert!(html.contains("<title>议题 · octocat/Hello-World</title>"));
        assert!(html.contains("lang=\"zh-CN\""));
    }

    #[test]
    fn read_stdin_write_file() {
        let dir = tempfile::tempdir().unwrap();
        let dictionary = write_dictionary(&dir);
        let out = dir.path().join("out.html");

        Command::cargo_bin("page-i18n")
            .unwrap()
            .arg("-d")
            .arg(&dictionary)
            .args(["-u", NOTIFICATIONS_URL, "-o"])
            .arg(&out)
            .write_stdin(page_html("Notifications", None, "<p>Inbox</p>"))
            .assert()
            .success();

        let html = fs::read_to_string(&out).unwrap();
        assert!(html.contains("<p>收件箱</p>"));
        assert!(html.contains("<title>通知</title>"));
    }

    #[test]
    fn no_regexp_flag() {
        let dir = tempfile::tempdir().unwrap();
        let dictionary = write_dictionary(&dir);

        let output = Command::cargo_bin("page-i18n")
            .unwrap()
            .arg("--dictionary")
            .arg(&dictionary)
            .args(["--url", ISSUES_URL, "--no-regexp", "-"])
            .write_stdin(page_html("x", Some(REPO_LOCATION), "<span>3 commits</span>"))
            .output()
            .unwrap();

        assert!(output.status.success());
        assert!(String::from_utf8_lossy(&output.stdout).contains("<span>3 commits</span>"));
    }

    #[test]
    fn logged_in_root_is_dashboard() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locals.json");
        fs::write(
            &path,
            DICTIONARY.replace(
                "\"notifications\": {",
                "\"dashboard\": { \"static\": { \"Home\": \"首页\" } },\n    \"notifications\": {",
            ),
        )
        .unwrap();

        let output = Command::cargo_bin("page-i18n")
            .unwrap()
            .arg("--dictionary")
            .arg(&path)
            .args(["--url", "https://github.com/", "--logged-in"])
            .write_stdin(page_html("GitHub", None, "<h2>Home</h2>"))
            .output()
            .unwrap();

        assert!(output.status.success());
        let html = String::from_utf8_lossy(&output.stdout);
        assert!(html.contains("<h2>首页</h2>"));
        assert!(html.contains("logged-in"));
    }

    #[test]
    fn print_env_docs() {
        let output = Command::cargo_bin("page-i18n")
            .unwrap()
            .arg("--env-docs")
            .output()
            .unwrap();

        assert!(output.status.success());
        assert!(String::from_utf8_lossy(&output.stdout).contains("PAGE_I18N_LOG_LEVEL"));
    }
}

#[cfg(test)]
mod failing {
    use assert_cmd::Command;

    use super::common::*;

    #[test]
    fn missing_url() {
        let dir = tempfile::tempdir().unwrap();
        let dictionary = write_dictionary(&dir);

        let output = Command::cargo_bin("page-i18n")
            .unwrap()
            .arg("--dictionary")
            .arg(&dictionary)
            .write_stdin("<p>Issues</p>")
            .output()
            .unwrap();

        assert_eq!(output.status.code(), Some(1));
        assert!(String::from_utf8_lossy(&output.stderr).contains("--url"));
    }

    #[test]
    fn missing_dictionary() {
        let dir = tempfile::tempdir().unwrap();

        let output = Command::cargo_bin("page-i18n")
            .unwrap()
            .arg("--dictionary")
            .arg(dir.path().join("missing.json"))
            .args(["--url", ISSUES_URL])
            .write_stdin("<p>Issues</p>")
            .output()
            .unwrap();

        assert_eq!(output.status.code(), Some(1));
        assert!(output.stdout.is_empty());
    }

    #[test]
    fn invalid_url() {
        let dir = tempfile::tempdir().unwrap();
        let dictionary = write_dictionary(&dir);

        Command::cargo_bin("page-i18n")
            .unwrap()
            .arg("--dictionary")
            .arg(&dictionary)
            .args(["--url", "not a url"])
            .write_stdin("<p>Issues</p>")
            .assert()
            .failure();
    }
}
