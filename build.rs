fn main() {
    // Bake package, git and timestamp metadata into OUT_DIR/built.rs
    built::write_built_file().expect("Failed to acquire build-time information");

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads/");
}
