//! Grammar families and the extension table that selects them.
//!
//! Each family is described by a [`GrammarSpec`]: a handful of node-kind
//! predicates that the extractor, signature synthesizer and callee finder
//! compose uniformly. Supporting a new language means adding a spec, not new
//! control flow.

use std::path::Path;

use indexmap::IndexMap;

// ---------------------------------------------------------------------------
// Grammar families
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Language {
    Python,
    JavaScript,
    Java,
    Cpp,
    C,
    CSharp,
}

impl Language {
    /// Grammar identifier, as used by tree-sitter grammar packages.
    pub fn grammar_id(self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::Java => "java",
            Language::Cpp => "cpp",
            Language::C => "c",
            Language::CSharp => "c_sharp",
        }
    }

    pub fn ts_language(self) -> tree_sitter::Language {
        match self {
            Language::Python => tree_sitter_python::LANGUAGE.into(),
            Language::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Language::Java => tree_sitter_java::LANGUAGE.into(),
            Language::Cpp => tree_sitter_cpp::LANGUAGE.into(),
            Language::C => tree_sitter_c::LANGUAGE.into(),
            Language::CSharp => tree_sitter_c_sharp::LANGUAGE.into(),
        }
    }

    pub fn spec(self) -> &'static GrammarSpec {
        match self {
            Language::Python => &PYTHON_SPEC,
            Language::JavaScript => &JAVASCRIPT_SPEC,
            Language::Java => &JAVA_SPEC,
            Language::Cpp => &CPP_SPEC,
            Language::C => &C_SPEC,
            Language::CSharp => &CSHARP_SPEC,
        }
    }
}

// ---------------------------------------------------------------------------
// Node-kind predicates
// ---------------------------------------------------------------------------

/// How a function's name and parameter list are located.
#[derive(Debug)]
pub enum NameLookup {
    /// C-family: a declarator child, searched depth-first for the first
    /// identifier and the first parameter list. Declarators wrapped in
    /// pointer/reference declarators are followed through their
    /// `declarator` field.
    Declarator {
        declarator_kinds: &'static [&'static str],
        identifier_kinds: &'static [&'static str],
        parameter_kinds: &'static [&'static str],
    },
    /// Name and parameters are direct fields of the function node.
    Fields {
        name_field: &'static str,
        parameters_field: &'static str,
    },
}

/// How a post-parameter return type is located.
#[derive(Debug)]
pub enum TrailingReturn {
    /// A node of one of these kinds, as a direct child of the function node
    /// or of its declarator. Its text already carries the arrow.
    Node(&'static [&'static str]),
    /// A field of the function node; `prefix` is prepended to its text.
    Field {
        field: &'static str,
        prefix: &'static str,
    },
}

/// How the callee text of a call node is taken.
#[derive(Debug)]
pub enum CalleeTarget {
    /// Verbatim text of this field.
    Field(&'static str),
    /// Text from the start of the call node up to this field.
    BeforeField(&'static str),
}

#[derive(Debug)]
pub struct GrammarSpec {
    pub function_kinds: &'static [&'static str],
    pub modifier_kinds: &'static [&'static str],
    /// Children of a modifier node that are dropped from the signature.
    pub annotation_kinds: &'static [&'static str],
    pub return_type_fields: &'static [&'static str],
    pub name_lookup: NameLookup,
    pub trailing_return: Option<TrailingReturn>,
    pub specifier_kinds: &'static [&'static str],
    pub template_kind: Option<&'static str>,
    pub body_kinds: &'static [&'static str],
    pub call_kinds: &'static [&'static str],
    pub callee_target: CalleeTarget,
}

impl GrammarSpec {
    pub fn is_function(&self, kind: &str) -> bool {
        self.function_kinds.contains(&kind)
    }

    pub fn is_body(&self, kind: &str) -> bool {
        self.body_kinds.contains(&kind)
    }

    pub fn is_call(&self, kind: &str) -> bool {
        self.call_kinds.contains(&kind)
    }
}

const C_DECLARATOR: NameLookup = NameLookup::Declarator {
    declarator_kinds: &["function_declarator"],
    identifier_kinds: &["identifier"],
    parameter_kinds: &["parameter_list"],
};

static C_SPEC: GrammarSpec = GrammarSpec {
    function_kinds: &["function_definition"],
    modifier_kinds: &["storage_class_specifier", "type_qualifier"],
    annotation_kinds: &[],
    return_type_fields: &["type"],
    name_lookup: C_DECLARATOR,
    trailing_return: None,
    specifier_kinds: &[],
    template_kind: None,
    body_kinds: &["compound_statement"],
    call_kinds: &["call_expression"],
    callee_target: CalleeTarget::Field("function"),
};

static CPP_SPEC: GrammarSpec = GrammarSpec {
    function_kinds: &["function_definition"],
    modifier_kinds: &["storage_class_specifier", "type_qualifier", "virtual"],
    annotation_kinds: &[],
    return_type_fields: &["type"],
    name_lookup: NameLookup::Declarator {
        declarator_kinds: &["function_declarator"],
        identifier_kinds: &[
            "identifier",
            "field_identifier",
            "destructor_name",
            "operator_name",
        ],
        parameter_kinds: &["parameter_list"],
    },
    trailing_return: Some(TrailingReturn::Node(&["trailing_return_type"])),
    specifier_kinds: &[
        "type_qualifier",
        "ref_qualifier",
        "noexcept",
        "throw_specifier",
        "virtual_specifier",
    ],
    template_kind: Some("template_declaration"),
    body_kinds: &["compound_statement"],
    call_kinds: &["call_expression"],
    callee_target: CalleeTarget::Field("function"),
};

static PYTHON_SPEC: GrammarSpec = GrammarSpec {
    function_kinds: &["function_definition"],
    modifier_kinds: &["async"],
    annotation_kinds: &[],
    return_type_fields: &[],
    name_lookup: NameLookup::Fields {
        name_field: "name",
        parameters_field: "parameters",
    },
    trailing_return: Some(TrailingReturn::Field {
        field: "return_type",
        prefix: "->",
    }),
    specifier_kinds: &[],
    template_kind: None,
    body_kinds: &["block"],
    call_kinds: &["call"],
    callee_target: CalleeTarget::Field("function"),
};

static JAVASCRIPT_SPEC: GrammarSpec = GrammarSpec {
    function_kinds: &[
        "function_declaration",
        "generator_function_declaration",
        "method_definition",
    ],
    modifier_kinds: &["async", "static", "get", "set"],
    annotation_kinds: &[],
    return_type_fields: &[],
    name_lookup: NameLookup::Fields {
        name_field: "name",
        parameters_field: "parameters",
    },
    trailing_return: None,
    specifier_kinds: &[],
    template_kind: None,
    body_kinds: &["statement_block"],
    call_kinds: &["call_expression"],
    callee_target: CalleeTarget::Field("function"),
};

static JAVA_SPEC: GrammarSpec = GrammarSpec {
    function_kinds: &["method_declaration", "constructor_declaration"],
    modifier_kinds: &["modifiers"],
    annotation_kinds: &["annotation", "marker_annotation"],
    return_type_fields: &["type"],
    name_lookup: NameLookup::Fields {
        name_field: "name",
        parameters_field: "parameters",
    },
    trailing_return: None,
    specifier_kinds: &["throws"],
    template_kind: None,
    body_kinds: &["block", "constructor_body"],
    call_kinds: &["method_invocation"],
    callee_target: CalleeTarget::BeforeField("arguments"),
};

static CSHARP_SPEC: GrammarSpec = GrammarSpec {
    function_kinds: &["method_declaration", "constructor_declaration"],
    modifier_kinds: &["modifier"],
    annotation_kinds: &[],
    return_type_fields: &["returns", "type"],
    name_lookup: NameLookup::Fields {
        name_field: "name",
        parameters_field: "parameters",
    },
    trailing_return: None,
    specifier_kinds: &[],
    template_kind: None,
    body_kinds: &["block"],
    call_kinds: &["invocation_expression"],
    callee_target: CalleeTarget::Field("function"),
};

// ---------------------------------------------------------------------------
// Extension table
// ---------------------------------------------------------------------------

const STANDARD_EXTENSIONS: &[(&str, Language)] = &[
    (".py", Language::Python),
    (".js", Language::JavaScript),
    (".java", Language::Java),
    (".cpp", Language::Cpp),
    (".cc", Language::Cpp),
    (".c", Language::C),
    (".h", Language::C),
    (".cs", Language::CSharp),
];

/// Immutable extension → grammar table, built once and passed to every
/// component that needs to decide whether (and how) a file is parsed.
#[derive(Clone, Debug)]
pub struct LanguageTable {
    by_extension: IndexMap<String, Language>,
}

impl Default for LanguageTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl LanguageTable {
    pub fn standard() -> Self {
        let by_extension = STANDARD_EXTENSIONS
            .iter()
            .map(|(ext, lang)| (ext.to_string(), *lang))
            .collect();
        Self { by_extension }
    }

    /// Look up an extension given with its leading dot (`".c"`).
    /// Matching is case-sensitive.
    pub fn for_extension(&self, extension: &str) -> Option<Language> {
        self.by_extension.get(extension).copied()
    }

    pub fn for_path(&self, path: &Path) -> Option<Language> {
        let ext = path.extension()?.to_str()?;
        self.for_extension(&format!(".{ext}"))
    }

    pub fn is_code_file(&self, path: &Path) -> bool {
        self.for_path(path).is_some()
    }

    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.by_extension.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table_grammar_ids() {
        let table = LanguageTable::standard();
        let expected = [
            (".py", "python"),
            (".js", "javascript"),
            (".java", "java"),
            (".cpp", "cpp"),
            (".cc", "cpp"),
            (".c", "c"),
            (".h", "c"),
            (".cs", "c_sharp"),
        ];
        for (ext, grammar) in expected {
            let lang = table.for_extension(ext).unwrap();
            assert_eq!(lang.grammar_id(), grammar, "{ext}");
        }
        assert_eq!(table.extensions().count(), expected.len());
    }

    #[test]
    fn test_unknown_extensions_invisible() {
        let table = LanguageTable::standard();
        assert!(table.for_extension(".rs").is_none());
        assert!(table.for_extension(".hpp").is_none());
        assert!(!table.is_code_file(Path::new("README.md")));
        assert!(!table.is_code_file(Path::new("Makefile")));
        assert!(table.is_code_file(Path::new("src/net/socket.c")));
    }

    #[test]
    fn test_extension_match_is_case_sensitive() {
        let table = LanguageTable::standard();
        assert!(table.for_path(Path::new("legacy/MAIN.C")).is_none());
    }

    #[test]
    fn test_every_grammar_loads() {
        for (_, lang) in STANDARD_EXTENSIONS {
            let mut parser = tree_sitter::Parser::new();
            assert!(parser.set_language(&lang.ts_language()).is_ok());
        }
    }
}
