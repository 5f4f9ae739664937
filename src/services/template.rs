//! LaTeX 文档模板

use crate::services::language::Language;
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// 模板占位符 `{{name}}`
fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{\{([a-z]+)\}\}").expect("占位符正则无效"))
}

const VERBATIM_TEMPLATE: &str = r"
\documentclass{article}
\usepackage{geometry}
\usepackage{fancyhdr}

\begin{document}

\setlength{\headheight}{15.2pt}
\pagestyle{fancy}
\fancyhf{}
\lhead{{{student}}: {{filename}}}

\begin{verbatim}
{{body}}
\end{verbatim}
\end{document}
";

const LISTING_TEMPLATE: &str = r"
\documentclass{article}
\usepackage{listings}
\usepackage{color}
\usepackage{textcomp}
\definecolor{listinggray}{gray}{0.9}
\definecolor{lbcolor}{rgb}{0.9,0.9,0.9}
\lstset{
    backgroundcolor=\color{lbcolor},
    tabsize=4,
    rulecolor=,
    basicstyle=\scriptsize,
    upquote=true,
    aboveskip={1.5\baselineskip},
    columns=fixed,
    showstringspaces=false,
    extendedchars=true,
    numbers=left,
    breaklines=true,
    prebreak = \raisebox{0ex}[0ex][0ex]{\ensuremath{\hookleftarrow}},
    frame=single,
    showtabs=false,
    showspaces=false,
    identifierstyle=\ttfamily,
    keywordstyle=\color[rgb]{0,0,1},
    commentstyle=\color[rgb]{0.133,0.545,0.133},
    stringstyle=\color[rgb]{0.627,0.126,0.941},
}
\usepackage{geometry}
\usepackage{fancyhdr}

\begin{document}

\setlength{\headheight}{15.2pt}
\pagestyle{fancy}
\fancyhf{}
\lhead{{{student}}: {{filename}}}

\begin{lstlisting}[language={{language}}]
{{body}}
\end{lstlisting}
\end{document}
";

/// 生成 LaTeX 源文件内容
///
/// # 参数
/// - `student`: 页眉中的学生名（已转义）
/// - `filename`: 页眉中的文件名（已转义）
/// - `language`: 排版方式
/// - `body`: 文件原文
pub fn render(student: &str, filename: &str, language: &Language, body: &str) -> String {
    let (template, end_marker, dialect) = match language {
        Language::Verbatim => (VERBATIM_TEMPLATE, r"\end{verbatim}", ""),
        Language::Listing(dialect) => (LISTING_TEMPLATE, r"\end{lstlisting}", dialect.as_str()),
    };
    let body = defuse_end_marker(body, end_marker);

    // 一次扫描完成替换，填入的内容不会再被当成占位符
    placeholder()
        .replace_all(template, |caps: &Captures| match &caps[1] {
            "student" => student.to_string(),
            "filename" => filename.to_string(),
            "language" => dialect.to_string(),
            "body" => body.clone(),
            _ => caps[0].to_string(),
        })
        .into_owned()
}

/// 正文中出现结束标记时，在反斜杠后插入空格，防止环境提前结束
fn defuse_end_marker(body: &str, end_marker: &str) -> String {
    if !body.contains(end_marker) {
        return body.to_string();
    }
    let defused = format!("\\ {}", &end_marker[1..]);
    body.replace(end_marker, &defused)
}
