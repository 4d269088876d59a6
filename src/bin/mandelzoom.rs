// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate clap;
extern crate mandelzoom;
extern crate num;
extern crate num_cpus;
extern crate tracing;
extern crate tracing_subscriber;

use clap::{App, Arg, ArgMatches};
use mandelzoom::planes::Num;
use mandelzoom::{Config, FrameRetention, ZoomSchedule};
use num::Complex;
use std::fs::{self, File};
use std::io::BufWriter;
use std::process;
use std::str::FromStr;
use tracing::Level;

fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn parse_complex(s: &str) -> Option<Complex<Num>> {
    match parse_pair(s, ',') {
        Some((re, im)) => Some(Complex { re, im }),
        None => None,
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + PartialOrd>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const POI: &str = "poi";
const FRAMES: &str = "frames";
const SCALE_START: &str = "scale-start";
const SCALE_END: &str = "scale-end";
const ITERATIONS: &str = "iterations";
const BAILOUT: &str = "bailout";
const DELAY: &str = "delay";
const LOOPS: &str = "loops";
const THREADS: &str = "threads";
const RETAIN: &str = "retain";
const VERBOSE: &str = "verbose";

fn args<'a>(defaults: &'a [String; 3]) -> ArgMatches<'a> {
    let max_threads = num_cpus::get();

    App::new("mandelzoom")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Renders an animated Mandelbrot zoom to a looping GIF")
        .arg(
            Arg::with_name(OUTPUT)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .default_value("mandelbrot.gif")
                .help("Output file"),
        )
        .arg(
            Arg::with_name(SIZE)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("256x256")
                .validator(|s| validate_pair::<u16>(&s, 'x', "Could not parse frame size"))
                .help("Size of each frame"),
        )
        .arg(
            Arg::with_name(POI)
                .long(POI)
                .short("p")
                .takes_value(true)
                .default_value(&defaults[0])
                .allow_hyphen_values(true)
                .validator(|s| validate_pair::<Num>(&s, ',', "Could not parse point of interest"))
                .help("Point the zoom converges on, as re,im"),
        )
        .arg(
            Arg::with_name(FRAMES)
                .long(FRAMES)
                .short("f")
                .takes_value(true)
                .default_value("300")
                .validator(|s| {
                    validate_range(
                        &s,
                        1usize,
                        100_000,
                        "Could not parse frame count",
                        "Frame count must be between 1 and 100000",
                    )
                })
                .help("Number of frames"),
        )
        .arg(
            Arg::with_name(SCALE_START)
                .long(SCALE_START)
                .takes_value(true)
                .default_value(&defaults[1])
                .validator(|s| {
                    validate_range(
                        &s,
                        ::std::f32::MIN_POSITIVE,
                        ::std::f32::MAX,
                        "Could not parse start scale",
                        "Start scale must be positive",
                    )
                })
                .help("Zoom scale of the first frame"),
        )
        .arg(
            Arg::with_name(SCALE_END)
                .long(SCALE_END)
                .takes_value(true)
                .default_value(&defaults[2])
                .validator(|s| {
                    validate_range(
                        &s,
                        ::std::f32::MIN_POSITIVE,
                        ::std::f32::MAX,
                        "Could not parse end scale",
                        "End scale must be positive",
                    )
                })
                .help("Zoom scale one frame past the last"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("600")
                .validator(|s| {
                    validate_range(
                        &s,
                        1usize,
                        1_000_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 1000000",
                    )
                })
                .help("Maximum iterations per pixel"),
        )
        .arg(
            Arg::with_name(BAILOUT)
                .long(BAILOUT)
                .takes_value(true)
                .default_value("4")
                .validator(|s| {
                    validate_range(
                        &s,
                        1.0 + ::std::f32::EPSILON,
                        ::std::f32::MAX,
                        "Could not parse bailout radius",
                        "Bailout radius must be greater than 1",
                    )
                })
                .help("Escape radius"),
        )
        .arg(
            Arg::with_name(DELAY)
                .long(DELAY)
                .short("d")
                .takes_value(true)
                .default_value("6")
                .validator(|s| {
                    validate_range(
                        &s,
                        0u16,
                        ::std::u16::MAX,
                        "Could not parse frame delay",
                        "Frame delay must fit in 16 bits",
                    )
                })
                .help("Delay per frame in hundredths of a second"),
        )
        .arg(
            Arg::with_name(LOOPS)
                .long(LOOPS)
                .takes_value(true)
                .default_value("0")
                .validator(|s| {
                    validate_range(
                        &s,
                        0u16,
                        ::std::u16::MAX,
                        "Could not parse loop count",
                        "Loop count must fit in 16 bits",
                    )
                })
                .help("Number of repetitions, 0 for forever"),
        )
        .arg(
            Arg::with_name(THREADS)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of render threads (default: all cores)"),
        )
        .arg(
            Arg::with_name(RETAIN)
                .long(RETAIN)
                .help("Render every frame before encoding any of them"),
        )
        .arg(
            Arg::with_name(VERBOSE)
                .short("v")
                .multiple(true)
                .help("More logging; repeat for more"),
        )
        .get_matches()
}

fn value<T: FromStr>(matches: &ArgMatches, name: &str) -> T {
    match matches.value_of(name).map(T::from_str) {
        Some(Ok(v)) => v,
        _ => {
            eprintln!("Could not parse --{}", name);
            process::exit(2);
        }
    }
}

fn config(matches: &ArgMatches) -> Config {
    let defaults = Config::default();
    let size = parse_pair::<usize>(matches.value_of(SIZE).unwrap_or("256x256"), 'x')
        .unwrap_or((defaults.width, defaults.height));
    let poi = matches
        .value_of(POI)
        .and_then(parse_complex)
        .unwrap_or(defaults.schedule.poi);
    Config {
        width: size.0,
        height: size.1,
        max_iterations: value(matches, ITERATIONS),
        bailout: value(matches, BAILOUT),
        schedule: ZoomSchedule {
            poi,
            frames: value(matches, FRAMES),
            scale_start: value(matches, SCALE_START),
            scale_end: value(matches, SCALE_END),
        },
        delay: value(matches, DELAY),
        loops: value(matches, LOOPS),
        threads: if matches.is_present(THREADS) {
            value(matches, THREADS)
        } else {
            defaults.threads
        },
        retention: if matches.is_present(RETAIN) {
            FrameRetention::Retain
        } else {
            FrameRetention::Stream
        },
    }
}

fn main() {
    let reference = ZoomSchedule::default();
    let defaults = [
        format!("{},{}", reference.poi.re, reference.poi.im),
        reference.scale_start.to_string(),
        reference.scale_end.to_string(),
    ];
    let matches = args(&defaults);

    let level = match matches.occurrences_of(VERBOSE) {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(::std::io::stderr)
        .init();

    let config = config(&matches);
    if let Err(e) = config.validate() {
        eprintln!("Refusing to start: {}", e);
        process::exit(2);
    }

    let output = matches.value_of(OUTPUT).unwrap_or("mandelbrot.gif");
    let file = match File::create(output) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Could not create {}: {}", output, e);
            process::exit(1);
        }
    };

    match mandelzoom::run(&config, BufWriter::new(file)) {
        Err(e) => {
            eprintln!("Render failure: {}", e);
            let _ = fs::remove_file(output);
            process::exit(1);
        }
        Ok((_, stats)) => {
            tracing::info!(
                "wrote {} frame(s) to {} (render {:?}, encode {:?})",
                stats.frames,
                output,
                stats.render_time,
                stats.encode_time
            );
        }
    }
}
