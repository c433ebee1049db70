//! Fake executables for integration tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// kubectl stand-in that keeps secrets as files next to the script and logs
/// every invocation to `calls.log`.
const FAKE_KUBECTL: &str = r#"#!/bin/sh
root="$(dirname "$0")"
dir="$root/secrets"
mkdir -p "$dir"
echo "$@" >> "$root/calls.log"

case "$1" in
  get)
    name="$3"
    if [ -f "$dir/$name" ]; then
      case "$*" in
        *"-o json"*)
          printf '{"apiVersion":"v1","kind":"Secret","data":{".dockerconfigjson":"%s"}}' "$(base64 < "$dir/$name" | tr -d '\n')"
          ;;
        *)
          echo "secret/$name"
          ;;
      esac
    fi
    ;;
  create)
    name="$4"
    while [ $# -gt 0 ]; do
      if [ "$1" = "--from-literal" ]; then
        printf '%s' "${2#.dockerconfigjson=}" > "$dir/$name"
      fi
      shift
    done
    echo "secret/$name created"
    ;;
  delete)
    name="$3"
    if [ ! -f "$dir/$name" ]; then
      echo "Error from server (NotFound): secrets \"$name\" not found" >&2
      exit 1
    fi
    rm -f "$dir/$name"
    echo "secret \"$name\" deleted"
    ;;
esac
"#;

/// docker-credential helper that knows helper.example.com and Docker Hub
const FAKE_HELPER: &str = r#"#!/bin/sh
read server
if [ "$server" = "helper.example.com" ] || [ "$server" = "https://index.docker.io/v1/" ]; then
  printf '{"ServerURL":"%s","Username":"helper-user","Secret":"helper-pass"}' "$server"
else
  echo "credentials not found in native keychain"
  exit 1
fi
"#;

fn write_executable(path: &Path, content: &str) {
    fs::write(path, content).unwrap();

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(path, perms).unwrap();
    }
}

/// Install a fake kubectl in `dir` and return its path
pub fn fake_kubectl(dir: &Path) -> PathBuf {
    let path = dir.join("kubectl");
    write_executable(&path, FAKE_KUBECTL);
    path
}

/// Install `docker-credential-fake` in `dir`
pub fn fake_credential_helper(dir: &Path) -> PathBuf {
    let path = dir.join("docker-credential-fake");
    write_executable(&path, FAKE_HELPER);
    path
}

/// Arguments of every fake kubectl invocation so far
pub fn kubectl_calls(dir: &Path) -> Vec<String> {
    fs::read_to_string(dir.join("calls.log"))
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

/// Write a Docker config.json into `dir`
pub fn docker_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("config.json");
    fs::write(&path, content).unwrap();
    path
}
