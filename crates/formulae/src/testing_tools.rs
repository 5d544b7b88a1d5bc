macro_rules! assert_miette_report {
    ($diag:expr, [$($fragment:literal),+ $(,)?]) => {{
        use miette::{GraphicalReportHandler, GraphicalTheme};

        let mut out = String::new();
        GraphicalReportHandler::new_themed(GraphicalTheme::unicode_nocolor())
            .with_width(200)
            .render_report(&mut out, &*$diag.unwrap_err())
            .unwrap();
        $(
            assert!(
                out.contains($fragment),
                "{} rendered without {:?}:\n{out}",
                stringify!($diag),
                $fragment
            );
        )+
    }};
}

pub(crate) use assert_miette_report;
