use super::*;
use crate::catalog::Catalog;
use crate::foundation::error::ErrorKind;

#[test]
fn builtin_binds_every_catalog_operator() {
    let reg = OperatorRegistry::builtin();
    let catalog = Catalog::builtin();
    let names: Vec<&str> = catalog.iter().map(|d| d.name).collect();
    reg.check_bindings(names.iter().copied()).unwrap();
    assert_eq!(reg.names().len(), catalog.len());
}

#[test]
fn unbound_name_is_a_missing_binding() {
    let reg = OperatorRegistry::new();
    let err = reg.check_bindings(["Rotate"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingBinding);
}

#[test]
fn closures_can_be_registered_and_replaced() {
    let mut reg = OperatorRegistry::new();
    assert!(reg.register("Invert", from_fn(|_, img, _| Ok(img))).is_none());
    let replaced = reg.register(
        "Invert",
        from_fn(|_, mut img: DynamicImage, _| {
            img.invert();
            Ok(img)
        }),
    );
    assert!(replaced.is_some());

    let src = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, image::Rgb([10, 20, 30])));
    let out = reg.apply("Invert", &ConcreteParams::new(), src, 0).unwrap();
    assert_eq!(out.to_rgb8().get_pixel(0, 0), &image::Rgb([245, 235, 225]));
}

#[test]
fn builtins_reject_missing_parameters() {
    let reg = OperatorRegistry::builtin();
    let src = DynamicImage::ImageRgb8(RgbImage::new(4, 4));
    let err = reg
        .apply("Rotate", &ConcreteParams::new(), src.clone(), 0)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Operator);

    let err = reg
        .apply("Rotate", &ConcreteParams::new().with("rotate", f64::NAN), src, 0)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Operator);
}

#[test]
fn empty_output_is_an_operator_error() {
    let mut reg = OperatorRegistry::new();
    reg.register("Vanish", from_fn(|_, _, _| Ok(DynamicImage::new_rgb8(0, 0))));
    let src = DynamicImage::ImageRgb8(RgbImage::new(3, 3));
    let err = reg.apply("Vanish", &ConcreteParams::new(), src, 0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Operator);
    assert!(err.to_string().contains("Vanish"));
}

#[test]
fn op_context_seed_drives_its_generator() {
    use rand::RngCore;
    let mut a = OpContext::new(9);
    let mut b = OpContext::new(9);
    assert_eq!(a.seed(), 9);
    assert_eq!(a.rng().next_u64(), b.rng().next_u64());
}
