// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate assert_cmd;
extern crate predicates;
extern crate tempfile;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;

#[test]
fn writes_a_small_animation() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("zoom.gif");
    Command::cargo_bin("mandelzoom")
        .unwrap()
        .arg("-o")
        .arg(&output)
        .args(&["--size", "16x12", "--frames", "3", "--iterations", "100", "-t", "1"])
        .assert()
        .success();
    let bytes = fs::read(&output).unwrap();
    assert_eq!(&bytes[..6], b"GIF89a");
    assert_eq!(&bytes[6..10], &[16, 0, 12, 0]);
    assert_eq!(*bytes.last().unwrap(), 0x3B);
}

#[test]
fn retained_frames_write_the_same_file() {
    let dir = tempfile::tempdir().unwrap();
    let streamed = dir.path().join("streamed.gif");
    let retained = dir.path().join("retained.gif");
    for (path, extra) in &[(&streamed, None), (&retained, Some("--retain"))] {
        let mut cmd = Command::cargo_bin("mandelzoom").unwrap();
        cmd.arg("-o")
            .arg(path)
            .args(&["--size", "12x12", "--frames", "2", "--iterations", "50"]);
        if let Some(flag) = *extra {
            cmd.arg(flag);
        }
        cmd.assert().success();
    }
    assert_eq!(fs::read(&streamed).unwrap(), fs::read(&retained).unwrap());
}

#[test]
fn equal_scales_are_refused_before_any_output() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("never.gif");
    Command::cargo_bin("mandelzoom")
        .unwrap()
        .arg("-o")
        .arg(&output)
        .args(&["--scale-start", "50", "--scale-end", "50"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Refusing to start"));
    assert!(!output.exists());
}

#[test]
fn malformed_sizes_are_rejected() {
    Command::cargo_bin("mandelzoom")
        .unwrap()
        .args(&["--size", "huge"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not parse frame size"));
}
