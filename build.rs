fn main() {
    // Compile the code blocks in `README.md` as doc tests.
    #[cfg(feature = "skeptic")]
    {
        println!("cargo:rerun-if-changed=README.md");
        skeptic::generate_doc_tests(&["README.md"]);
    }
}
