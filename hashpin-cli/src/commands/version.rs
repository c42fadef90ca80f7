//! `hashpin version`

use crate::config::RunConfig;

pub fn run(config: &RunConfig) {
    let build = &config.build;
    println!("hashpin {}", build.version);
    println!("Git commit: {}", build.git_commit);
    println!("Build time: {}", build.build_time);
}
