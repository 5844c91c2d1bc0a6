//! Cobertura XML output.
//!
//! Layout follows `coverage-03.dtd`. Go profiles carry no branch data, so
//! every `branch-rate` repeats the corresponding `line-rate`, and
//! `complexity` is always 0.
use std::io::Write;

use quick_xml::events::{BytesDecl, BytesText, Event};
use quick_xml::writer::Writer;

use crate::error::Result;
use crate::model::{Class, Coverage, Line, Method, Package};

const DOCTYPE: &str =
    r#"coverage SYSTEM "http://cobertura.sourceforge.net/xml/coverage-03.dtd""#;

/// Rates are printed at `f32` precision in their shortest form: `0`, `1`,
/// `0.6666667`.
fn format_rate(rate: f64) -> String {
    (rate as f32).to_string()
}

/// Write the whole report, including the XML declaration, DOCTYPE and a
/// trailing newline.
pub fn write_report<W: Write>(coverage: &Coverage, out: W) -> Result<()> {
    let mut writer = Writer::new_with_indent(out, b'\t', 1);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::DocType(BytesText::from_escaped(DOCTYPE)))?;

    let (covered, valid) = coverage.line_counts();
    let rate = format_rate(coverage.line_rate());
    let covered = covered.to_string();
    let valid = valid.to_string();
    let timestamp = coverage.timestamp.to_string();

    writer
        .create_element("coverage")
        .with_attributes([
            ("line-rate", rate.as_str()),
            ("branch-rate", rate.as_str()),
            ("lines-covered", covered.as_str()),
            ("lines-valid", valid.as_str()),
            ("branches-covered", "0"),
            ("branches-valid", "0"),
            ("complexity", "0"),
            ("version", ""),
            ("timestamp", timestamp.as_str()),
        ])
        .write_inner_content(|w| {
            w.create_element("sources").write_inner_content(|w| {
                for source in &coverage.sources {
                    w.create_element("source")
                        .write_text_content(BytesText::new(&source.path))?;
                }
                Ok::<(), quick_xml::Error>(())
            })?;
            w.create_element("packages").write_inner_content(|w| {
                for package in &coverage.packages {
                    write_package(w, package)?;
                }
                Ok::<(), quick_xml::Error>(())
            })?;
            Ok::<(), quick_xml::Error>(())
        })?;

    let out = writer.get_mut();
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

fn write_package<W: Write>(w: &mut Writer<W>, package: &Package) -> quick_xml::Result<()> {
    let rate = format_rate(package.line_rate());
    w.create_element("package")
        .with_attributes([
            ("name", package.name.as_str()),
            ("line-rate", rate.as_str()),
            ("branch-rate", rate.as_str()),
            ("complexity", "0"),
        ])
        .write_inner_content(|w| {
            w.create_element("classes").write_inner_content(|w| {
                for class in &package.classes {
                    write_class(w, class)?;
                }
                Ok::<(), quick_xml::Error>(())
            })?;
            Ok::<(), quick_xml::Error>(())
        })?;
    Ok(())
}

fn write_class<W: Write>(w: &mut Writer<W>, class: &Class) -> quick_xml::Result<()> {
    let rate = format_rate(class.line_rate());
    w.create_element("class")
        .with_attributes([
            ("name", class.name.as_str()),
            ("filename", class.filename.as_str()),
            ("line-rate", rate.as_str()),
            ("branch-rate", rate.as_str()),
            ("complexity", "0"),
        ])
        .write_inner_content(|w| {
            w.create_element("methods").write_inner_content(|w| {
                for method in &class.methods {
                    write_method(w, method)?;
                }
                Ok::<(), quick_xml::Error>(())
            })?;
            write_lines(w, &class.lines)
        })?;
    Ok(())
}

fn write_method<W: Write>(w: &mut Writer<W>, method: &Method) -> quick_xml::Result<()> {
    let rate = format_rate(method.line_rate());
    w.create_element("method")
        .with_attributes([
            ("name", method.name.as_str()),
            ("signature", ""),
            ("line-rate", rate.as_str()),
            ("branch-rate", rate.as_str()),
            ("complexity", "0"),
        ])
        .write_inner_content(|w| write_lines(w, &method.lines))?;
    Ok(())
}

fn write_lines<W: Write>(w: &mut Writer<W>, lines: &[Line]) -> quick_xml::Result<()> {
    w.create_element("lines").write_inner_content(|w| {
        for line in lines {
            let number = line.number.to_string();
            let hits = line.hits.to_string();
            w.create_element("line")
                .with_attributes([("number", number.as_str()), ("hits", hits.as_str())])
                .write_empty()?;
        }
        Ok::<(), quick_xml::Error>(())
    })?;
    Ok(())
}
