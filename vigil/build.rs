fn main() {
    let _shadow = shadow_rs::ShadowBuilder::builder()
        .build()
        .expect("build metadata should be generated");
}
