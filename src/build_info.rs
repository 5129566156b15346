//! Build metadata baked in by `build.rs`

#[allow(dead_code)]
mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

#[derive(Debug)]
pub struct BuildInfo {
    pub version: &'static str,
    pub git_hash: &'static str,
    pub git_branch: &'static str,
    pub build_time: &'static str,
    pub target: &'static str,
    pub profile: &'static str,
}

pub fn get_build_info() -> BuildInfo {
    BuildInfo {
        version: built_info::PKG_VERSION,
        git_hash: built_info::GIT_COMMIT_HASH_SHORT.unwrap_or("unknown"),
        git_branch: built_info::GIT_HEAD_REF
            .map(|r| r.trim_start_matches("refs/heads/"))
            .unwrap_or("unknown"),
        build_time: built_info::BUILT_TIME_UTC,
        target: built_info::TARGET,
        profile: built_info::PROFILE,
    }
}
