use std::fmt::Display;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use swe_contract::flags::{FLG_SPEED, FLG_SWIEPH};
use swe_contract::{
    AyanamsaFlags, Body, CalcFlags, CalendarType, EphemerisError, EphemerisProvider, HouseCusps,
    HouseFlags, HouseSystem, Position, SidMode, TopoLoc, UtcDateTime, conformance,
};
use swe_native::{NativeConfig, SwissEph};

#[derive(Parser)]
#[command(name = "swe", about = "Swiss Ephemeris CLI", version)]
struct Cli {
    /// TOML config file with library_path / ephe_path
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Swiss Ephemeris shared library
    #[arg(long, global = true)]
    lib: Option<PathBuf>,
    /// Directory with ephemeris files
    #[arg(long, global = true)]
    ephe: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct TimeArgs {
    /// Julian Date (UT unless --et)
    #[arg(long, conflicts_with = "date", required_unless_present = "date")]
    jd: Option<f64>,
    /// UTC timestamp (YYYY-MM-DDThh:mm:ssZ)
    #[arg(long)]
    date: Option<UtcDateTime>,
}

#[derive(Subcommand)]
enum Commands {
    /// Native library version
    Version,
    /// Position of a body
    Calc {
        /// Body name (sun, true-node, ...) or native id
        #[arg(value_parser = parse_body)]
        body: i32,
        #[command(flatten)]
        time: TimeArgs,
        /// Interpret the time as Ephemeris Time
        #[arg(long)]
        et: bool,
        /// Native calculation flags
        #[arg(long, default_value_t = FLG_SWIEPH | FLG_SPEED)]
        flags: i32,
        /// Sidereal mode id (sets the sidereal flag)
        #[arg(long)]
        sidereal: Option<i32>,
        /// Topocentric observer LAT,LON,ALT (sets the topocentric flag)
        #[arg(long, value_parser = parse_topo, allow_hyphen_values = true)]
        topo: Option<TopoLoc>,
        /// JPL ephemeris file (selects the JPL ephemeris)
        #[arg(long)]
        jpl_file: Option<String>,
    },
    /// Name of a body
    PlanetName {
        #[arg(value_parser = parse_body)]
        body: i32,
    },
    /// Ayanamsa; default sidereal mode unless --mode is given
    Ayanamsa {
        /// Julian Date (UT unless --et)
        jd: f64,
        #[arg(long)]
        et: bool,
        /// Sidereal mode id
        #[arg(long)]
        mode: Option<i32>,
        /// Native flags (ephemeris selection, nutation)
        #[arg(long, default_value_t = FLG_SWIEPH)]
        flags: i32,
    },
    /// Name of a sidereal mode
    AyanamsaName { mode: i32 },
    /// Calendar date to Julian Date
    JulDay {
        #[arg(allow_hyphen_values = true)]
        year: i32,
        month: i32,
        day: i32,
        #[arg(default_value_t = 0.0)]
        hour: f64,
        /// Julian instead of Gregorian calendar
        #[arg(long)]
        julian: bool,
    },
    /// Julian Date to calendar date
    RevJul {
        jd: f64,
        #[arg(long)]
        julian: bool,
    },
    /// UTC timestamp to ET and UT Julian Dates
    UtcToJd {
        date: UtcDateTime,
        #[arg(long)]
        julian: bool,
    },
    /// Julian Date in ET to UTC
    EtToUtc {
        jd: f64,
        #[arg(long)]
        julian: bool,
    },
    /// Julian Date in UT1 to UTC
    Ut1ToUtc {
        jd: f64,
        #[arg(long)]
        julian: bool,
    },
    /// House cusps for a time and place
    Houses {
        #[command(flatten)]
        time: TimeArgs,
        /// Geographic latitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Geographic longitude in degrees (east positive)
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// House system letter
        #[arg(long, default_value = "P")]
        hsys: HouseSystem,
        /// Sidereal mode id for sidereal cusps
        #[arg(long)]
        sidereal: Option<i32>,
    },
    /// House cusps from ARMC and obliquity
    HousesArmc {
        #[arg(long)]
        armc: f64,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long)]
        eps: f64,
        #[arg(long, default_value = "P")]
        hsys: HouseSystem,
    },
    /// House position of an ecliptic point
    HousePos {
        #[arg(long)]
        armc: f64,
        /// Geographic latitude in degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long)]
        eps: f64,
        /// Ecliptic longitude of the point
        #[arg(long)]
        point_lon: f64,
        /// Ecliptic latitude of the point
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        point_lat: f64,
        #[arg(long, default_value = "P")]
        hsys: HouseSystem,
    },
    /// Name of a house system
    HouseName { hsys: HouseSystem },
    /// Delta T in seconds
    DeltaT {
        jd: f64,
        /// Ephemeris flags for a consistent value
        #[arg(long)]
        flags: Option<i32>,
    },
    /// Equation of time in minutes
    TimeEqu { jd: f64 },
    /// Local mean time to local apparent time
    LmtToLat {
        jd: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },
    /// Local apparent time to local mean time
    LatToLmt {
        jd: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },
    /// Sidereal time in hours
    SidTime {
        /// Julian Date in UT
        jd: f64,
        /// Obliquity in degrees (with --nut, skips the native computation)
        #[arg(long, requires = "nut")]
        eps: Option<f64>,
        /// Nutation in longitude in degrees
        #[arg(long, requires = "eps", allow_hyphen_values = true)]
        nut: Option<f64>,
    },
    /// Run the conformance checks against the loaded library
    Conformance,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let config = native_config(&cli);
    let eph = SwissEph::open(&config).unwrap_or_else(|e| {
        eprintln!("Failed to load Swiss Ephemeris: {e}");
        std::process::exit(1);
    });
    log::debug!("using {}", eph.library_path().display());

    match cli.command {
        Commands::Version => println!("{}", eph.version()),

        Commands::Calc {
            body,
            time,
            et,
            flags,
            sidereal,
            topo,
            jpl_file,
        } => {
            let mut calc_flags = CalcFlags::new(flags);
            if let Some(mode) = sidereal {
                calc_flags = calc_flags.with_sid_mode(SidMode {
                    mode,
                    ..SidMode::default()
                });
            }
            if let Some(topo) = topo {
                calc_flags = calc_flags.with_topo(topo);
            }
            if let Some(name) = jpl_file {
                calc_flags = calc_flags.with_jpl_file(name);
            }
            let jd = time.julian_day(&eph, et);
            let pos = if et {
                or_exit(eph.calc(jd, body, &calc_flags), "calc")
            } else {
                or_exit(eph.calc_ut(jd, body, &calc_flags), "calc_ut")
            };
            println!("{} at JD {jd:.6} {}", eph.planet_name(body), if et { "ET" } else { "UT" });
            print_position(&pos);
        }

        Commands::PlanetName { body } => println!("{}", eph.planet_name(body)),

        Commands::Ayanamsa {
            jd,
            et,
            mode,
            flags,
        } => {
            let aya = match mode {
                None if et => eph.get_ayanamsa(jd),
                None => eph.get_ayanamsa_ut(jd),
                Some(mode) => {
                    let aya_flags = AyanamsaFlags::new(
                        flags,
                        SidMode {
                            mode,
                            ..SidMode::default()
                        },
                    );
                    if et {
                        or_exit(eph.get_ayanamsa_ex(jd, &aya_flags), "get_ayanamsa_ex")
                    } else {
                        or_exit(eph.get_ayanamsa_ex_ut(jd, &aya_flags), "get_ayanamsa_ex_ut")
                    }
                }
            };
            println!("{aya:.8}");
        }

        Commands::AyanamsaName { mode } => println!("{}", eph.get_ayanamsa_name(mode)),

        Commands::JulDay {
            year,
            month,
            day,
            hour,
            julian,
        } => println!("{:.8}", eph.jul_day(year, month, day, hour, calendar(julian))),

        Commands::RevJul { jd, julian } => {
            let date = eph.rev_jul(jd, calendar(julian));
            println!(
                "{:04}-{:02}-{:02} {:.8}h",
                date.year, date.month, date.day, date.hour
            );
        }

        Commands::UtcToJd { date, julian } => {
            let pair = or_exit(
                eph.utc_to_jd(
                    date.year,
                    date.month,
                    date.day,
                    date.decimal_hour(),
                    calendar(julian),
                ),
                "utc_to_jd",
            );
            println!("ET {:.8}", pair.et);
            println!("UT {:.8}", pair.ut);
            println!("Delta T {:.3} s", pair.delta_t_seconds());
        }

        Commands::EtToUtc { jd, julian } => println!("{}", eph.jd_et_to_utc(jd, calendar(julian))),

        Commands::Ut1ToUtc { jd, julian } => {
            println!("{}", eph.jd_ut1_to_utc(jd, calendar(julian)))
        }

        Commands::Houses {
            time,
            lat,
            lon,
            hsys,
            sidereal,
        } => {
            let ut = time.julian_day(&eph, false);
            let houses = match sidereal {
                Some(mode) => {
                    let flags = HouseFlags::sidereal(
                        0,
                        SidMode {
                            mode,
                            ..SidMode::default()
                        },
                    );
                    eph.houses_ex(ut, &flags, lat, lon, hsys)
                }
                None => eph.houses(ut, lat, lon, hsys),
            };
            println!("{} houses at JD {ut:.6} UT", eph.house_name(hsys));
            print_houses(&houses);
        }

        Commands::HousesArmc {
            armc,
            lat,
            eps,
            hsys,
        } => print_houses(&eph.houses_armc(armc, lat, eps, hsys)),

        Commands::HousePos {
            armc,
            lat,
            eps,
            point_lon,
            point_lat,
            hsys,
        } => {
            let pos = or_exit(
                eph.house_pos(armc, lat, eps, hsys, [point_lon, point_lat]),
                "house_pos",
            );
            println!("{pos:.6}");
        }

        Commands::HouseName { hsys } => println!("{}", eph.house_name(hsys)),

        Commands::DeltaT { jd, flags } => {
            let dt = match flags {
                Some(flags) => or_exit(eph.delta_t_ex(jd, flags), "delta_t_ex"),
                None => eph.delta_t(jd),
            };
            println!("{:.4} s", dt * 86_400.0);
        }

        Commands::TimeEqu { jd } => {
            let e = or_exit(eph.time_equ(jd), "time_equ");
            println!("{:.4} min", e * 1440.0);
        }

        Commands::LmtToLat { jd, lon } => {
            println!("{:.8}", or_exit(eph.lmt_to_lat(jd, lon), "lmt_to_lat"))
        }

        Commands::LatToLmt { jd, lon } => {
            println!("{:.8}", or_exit(eph.lat_to_lmt(jd, lon), "lat_to_lmt"))
        }

        Commands::SidTime { jd, eps, nut } => {
            let st = match (eps, nut) {
                (Some(eps), Some(nut)) => eph.sid_time0(jd, eps, nut),
                _ => eph.sid_time(jd),
            };
            println!("{st:.8} h");
        }

        Commands::Conformance => {
            let report = conformance::run_all(&eph);
            println!("{report}");
            if !report.passed() {
                std::process::exit(1);
            }
        }
    }
}

impl TimeArgs {
    /// Julian Date from --jd, or from --date converted to UT (ET with `et`).
    fn julian_day(&self, eph: &SwissEph, et: bool) -> f64 {
        if let Some(jd) = self.jd {
            return jd;
        }
        let Some(date) = &self.date else {
            eprintln!("Either --jd or --date is required");
            std::process::exit(1);
        };
        let pair = or_exit(
            eph.utc_to_jd(
                date.year,
                date.month,
                date.day,
                date.decimal_hour(),
                CalendarType::Gregorian,
            ),
            "utc_to_jd",
        );
        if et { pair.et } else { pair.ut }
    }
}

fn native_config(cli: &Cli) -> NativeConfig {
    let mut config = NativeConfig::from_env();
    if let Some(path) = &cli.config {
        config = config.with_file_overrides(path).unwrap_or_else(|e| {
            eprintln!("{e}");
            std::process::exit(1);
        });
    }
    if let Some(lib) = &cli.lib {
        config.library_path = lib.clone();
    }
    if let Some(ephe) = &cli.ephe {
        config.ephe_path = Some(ephe.clone());
    }
    config
}

fn or_exit<T>(result: Result<T, EphemerisError>, op: impl Display) -> T {
    result.unwrap_or_else(|e| {
        eprintln!("{op} failed: {e}");
        std::process::exit(1);
    })
}

fn calendar(julian: bool) -> CalendarType {
    if julian {
        CalendarType::Julian
    } else {
        CalendarType::Gregorian
    }
}

fn parse_body(s: &str) -> Result<i32, String> {
    if let Ok(id) = s.parse::<i32>() {
        return Ok(id);
    }
    Body::from_name(s)
        .map(Body::code)
        .ok_or_else(|| format!("unknown body: {s} (name like 'mars' or a native id)"))
}

fn parse_topo(s: &str) -> Result<TopoLoc, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!("expected LAT,LON,ALT, got {s}"));
    }
    let value = |i: usize| -> Result<f64, String> {
        parts[i]
            .parse::<f64>()
            .map_err(|e| format!("{}: {e}", parts[i]))
    };
    Ok(TopoLoc::new(value(0)?, value(1)?, value(2)?))
}

fn print_position(pos: &Position) {
    let labels = [
        "longitude",
        "latitude",
        "distance",
        "speed lon",
        "speed lat",
        "speed dist",
    ];
    for (label, value) in labels.iter().zip(pos.xx) {
        println!("  {label:<11}{value:>16.8}");
    }
    println!("  {:<11}{:>16}", "flags", pos.flags);
}

fn print_houses(houses: &HouseCusps) {
    for (i, cusp) in houses.cusps.iter().enumerate() {
        println!("  house {:>2}  {cusp:>12.6}", i + 1);
    }
    println!("  Asc       {:>12.6}", houses.ascendant());
    println!("  MC        {:>12.6}", houses.mc());
    println!("  ARMC      {:>12.6}", houses.armc());
    println!("  Vertex    {:>12.6}", houses.vertex());
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn body_by_name_or_id() {
        assert_eq!(parse_body("mars"), Ok(4));
        assert_eq!(parse_body("True-Node"), Ok(11));
        assert_eq!(parse_body("10433"), Ok(10_433));
        assert!(parse_body("nibiru").is_err());
    }

    #[test]
    fn topo_triplet() {
        let topo = parse_topo("-33.92, 18.42, 10").unwrap();
        assert_eq!(topo, TopoLoc::new(-33.92, 18.42, 10.0));
        assert!(parse_topo("1,2").is_err());
        assert!(parse_topo("a,2,3").is_err());
    }

    #[test]
    fn houses_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "swe", "houses", "--jd", "2451545", "--lat", "-33.9", "--lon", "-70.6", "--hsys", "k",
        ])
        .unwrap();
        match cli.command {
            Commands::Houses { lat, lon, hsys, .. } => {
                assert_eq!(lat, -33.9);
                assert_eq!(lon, -70.6);
                assert_eq!(hsys, HouseSystem::Koch);
            }
            _ => panic!("expected houses"),
        }
    }

    #[test]
    fn calc_requires_a_time() {
        assert!(Cli::try_parse_from(["swe", "calc", "sun"]).is_err());
        assert!(
            Cli::try_parse_from(["swe", "calc", "sun", "--jd", "1", "--date", "2000-01-01T00:00:00Z"])
                .is_err()
        );
        let cli = Cli::try_parse_from([
            "swe",
            "--lib",
            "/opt/libswe.so",
            "calc",
            "moon",
            "--date",
            "2024-03-20T03:06:00Z",
            "--sidereal",
            "1",
        ])
        .unwrap();
        assert_eq!(cli.lib, Some(PathBuf::from("/opt/libswe.so")));
        match cli.command {
            Commands::Calc {
                body,
                time,
                sidereal,
                flags,
                ..
            } => {
                assert_eq!(body, Body::Moon.code());
                assert!(time.jd.is_none());
                assert_eq!(time.date.map(|d| d.hour), Some(3));
                assert_eq!(sidereal, Some(1));
                assert_eq!(flags, FLG_SWIEPH | FLG_SPEED);
            }
            _ => panic!("expected calc"),
        }
    }
}
