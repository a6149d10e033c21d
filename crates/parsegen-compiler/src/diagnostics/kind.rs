//! The closed catalog of diagnostics.
//!
//! Every diagnostic the pipeline can produce is declared here with a stable
//! numeric code, a severity, and a message template. Templates use `{}`
//! placeholders filled positionally when the diagnostic is emitted.

/// Severity of a diagnostic.
///
/// The `OneOff` variants report like their plain counterparts but are
/// emitted at most once per kind per compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    WarningOneOff,
    Error,
    ErrorOneOff,
    Fatal,
}

impl Severity {
    pub fn is_error(self) -> bool {
        matches!(self, Severity::Error | Severity::ErrorOneOff | Severity::Fatal)
    }

    pub fn is_warning(self) -> bool {
        matches!(self, Severity::Warning | Severity::WarningOneOff)
    }

    pub fn one_off(self) -> bool {
        matches!(self, Severity::WarningOneOff | Severity::ErrorOneOff)
    }

    /// Label used by the printers.
    pub fn label(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning | Severity::WarningOneOff => "warning",
            Severity::Error | Severity::ErrorOneOff => "error",
            Severity::Fatal => "fatal",
        }
    }
}

/// Every diagnostic kind the compiler can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    // Tool-level.
    Internal,
    CannotWriteFile,

    // Syntax and structure.
    SyntaxError,
    RuleRedefinition,
    LexerRulesNotAllowed,
    ParserRulesNotAllowed,
    RepeatedPrequel,
    UndefinedRuleRef,
    UndefinedRuleInNonlocalRef,
    NoSuchGrammar,
    TokenNamesMustStartUpper,
    ParserRuleRefInLexerRule,
    ModeRedefinition,

    // Options.
    IllegalOption,
    IllegalOptionValue,
    OptionsInDelegate,
    RedundantCaseInsensitiveLexerRuleOption,

    // Actions and attributes.
    ActionRedefinition,
    UnknownAttributeReference,
    FragmentActionIgnored,

    // Rule references.
    RuleHasNoArgs,
    MissingRuleArgs,

    // Labels.
    LabelBlockNotASet,
    LabelConflictsWithRule,
    LabelConflictsWithToken,
    LabelConflictsWithArg,
    LabelConflictsWithRetval,
    LabelConflictsWithLocal,
    LabelTypeConflict,

    // Attribute declarations.
    ArgConflictsWithRule,
    RetvalConflictsWithRule,
    RetvalConflictsWithArg,
    LocalConflictsWithRule,
    LocalConflictsWithArg,
    LocalConflictsWithRetval,

    // Tokens and channels.
    ImplicitTokenDefinition,
    ImplicitStringDefinition,
    TokenNameReassignment,
    TokenConflictsWithCommonConstants,
    ChannelConflictsWithCommonConstants,
    ChannelConflictsWithToken,
    ChannelConflictsWithMode,
    ChannelsWithoutLexer,
    ConstantValueIsNotARecognizedTokenName,
    ConstantValueIsNotARecognizedChannelName,
    ConstantValueIsNotARecognizedModeName,

    // Lexer structure.
    ReservedRuleName,
    ModeConflictsWithCommonConstants,
    ModeConflictsWithToken,
    ModeWithoutRules,
    EpsilonToken,
    TokenUnreachable,
    CharactersCollisionInSet,
    RangeProbablyContainsNotImpliedCharacters,
    EmptyStringsAndSetsNotAllowed,
    InvalidLexerCommand,
    MissingLexerCommandArgument,
    UnwantedLexerCommandArgument,
    DuplicatedCommand,
    IncompatibleCommands,

    // Recursion.
    LeftRecursionCycles,

    // Configuration.
    WarningTreatedAsError,
}

impl DiagnosticKind {
    /// `(code, severity, template)` for this kind.
    fn spec(self) -> (u32, Severity, &'static str) {
        use DiagnosticKind::*;
        use Severity::*;
        match self {
            Internal => (1, Fatal, "internal error: {}"),
            CannotWriteFile => (2, Fatal, "cannot write file {}: {}"),

            SyntaxError => (50, Error, "syntax error: {}"),
            RuleRedefinition => (51, Error, "rule {} redefinition; previous at line {}"),
            LexerRulesNotAllowed => (52, Error, "lexer rule {} not allowed in parser grammar"),
            ParserRulesNotAllowed => (53, Error, "parser rule {} not allowed in lexer grammar"),
            RepeatedPrequel => (54, Error, "repeated grammar prequel spec ({}); please merge"),
            UndefinedRuleRef => (56, Error, "reference to undefined rule: {}"),
            UndefinedRuleInNonlocalRef => {
                (57, Error, "reference to undefined rule {} in non-local ref {}.{}")
            }
            NoSuchGrammar => (58, Error, "can't find or load grammar {}"),
            TokenNamesMustStartUpper => {
                (60, Error, "token names must start with an uppercase letter: {}")
            }
            ParserRuleRefInLexerRule => {
                (61, Error, "reference to parser rule {} in lexer rule {}")
            }
            ModeRedefinition => (62, Error, "mode {} redefinition"),

            IllegalOption => (83, Warning, "unsupported option {}"),
            IllegalOptionValue => (84, Warning, "unsupported option value {}={}"),
            OptionsInDelegate => {
                (85, Warning, "options ignored in imported grammar {}")
            }
            RedundantCaseInsensitiveLexerRuleOption => (
                86,
                Warning,
                "caseInsensitive lexer rule option is redundant because its value equals to global value ({})",
            ),

            ActionRedefinition => (69, Error, "redefinition of {} action"),
            UnknownAttributeReference => (65, Error, "unknown attribute reference {} in {}"),
            FragmentActionIgnored => (
                66,
                WarningOneOff,
                "fragment rule {} contains an action or command which can never be executed",
            ),

            RuleHasNoArgs => (70, Error, "rule {} has no defined parameters"),
            MissingRuleArgs => (71, Error, "missing argument(s) on rule reference: {}"),

            LabelBlockNotASet => (72, Error, "label {} assigned to a block which is not a set"),
            LabelConflictsWithRule => (73, Error, "label {} conflicts with rule with same name"),
            LabelConflictsWithToken => (74, Error, "label {} conflicts with token with same name"),
            LabelConflictsWithArg => (75, Error, "label {} conflicts with parameter with same name"),
            LabelConflictsWithRetval => {
                (76, Error, "label {} conflicts with return value with same name")
            }
            LabelConflictsWithLocal => (77, Error, "label {} conflicts with local with same name"),
            LabelTypeConflict => (78, Error, "label {} type mismatch with previous definition: {}"),

            ArgConflictsWithRule => (79, Error, "parameter {} conflicts with rule with same name"),
            RetvalConflictsWithRule => {
                (80, Error, "return value {} conflicts with rule with same name")
            }
            RetvalConflictsWithArg => {
                (81, Error, "return value {} conflicts with parameter with same name")
            }
            LocalConflictsWithRule => (87, Error, "local {} conflicts with rule with same name"),
            LocalConflictsWithArg => (88, Error, "local {} conflicts with parameter with same name"),
            LocalConflictsWithRetval => {
                (89, Error, "local {} conflicts with return value with same name")
            }

            ImplicitTokenDefinition => {
                (105, Warning, "implicit definition of token {} in parser")
            }
            ImplicitStringDefinition => (
                106,
                Error,
                "cannot create implicit token for string literal in non-combined grammar: {}",
            ),
            TokenNameReassignment => (108, Warning, "token name {} is already defined"),
            TokenConflictsWithCommonConstants => {
                (109, Error, "cannot use or declare token with reserved name {}")
            }
            ChannelConflictsWithCommonConstants => {
                (110, Error, "cannot use or declare channel with reserved name {}")
            }
            ChannelConflictsWithToken => {
                (111, Error, "channel {} conflicts with token with same name")
            }
            ChannelConflictsWithMode => {
                (112, Error, "channel {} conflicts with mode with same name")
            }
            ChannelsWithoutLexer => (
                113,
                Error,
                "custom channels are only valid in lexer grammars",
            ),
            ConstantValueIsNotARecognizedTokenName => {
                (114, Error, "{} is not a recognized token name")
            }
            ConstantValueIsNotARecognizedChannelName => {
                (115, Error, "{} is not a recognized channel name")
            }
            ConstantValueIsNotARecognizedModeName => {
                (116, Error, "{} is not a recognized mode name")
            }

            ReservedRuleName => (117, Error, "cannot declare a rule with reserved name {}"),
            ModeConflictsWithCommonConstants => {
                (118, Error, "cannot use or declare mode with reserved name {}")
            }
            ModeConflictsWithToken => {
                (131, Error, "mode {} conflicts with token with same name")
            }
            ModeWithoutRules => (
                119,
                Error,
                "lexer mode {} must contain at least one non-fragment rule",
            ),
            EpsilonToken => (
                120,
                Warning,
                "non-fragment lexer rule {} can match the empty string",
            ),
            TokenUnreachable => (
                121,
                Warning,
                "one of the token {} values unreachable. '{}' is always overlapped by token {}",
            ),
            CharactersCollisionInSet => {
                (122, Warning, "chars {} used multiple times in set {}")
            }
            RangeProbablyContainsNotImpliedCharacters => (
                123,
                Warning,
                "chars '{}'..'{}' used in a range probably contain not implied characters. Both bounds should be defined in lower or upper case",
            ),
            EmptyStringsAndSetsNotAllowed => {
                (124, Error, "string literals and sets cannot be empty: {}")
            }
            InvalidLexerCommand => (125, Error, "lexer command {} does not exist"),
            MissingLexerCommandArgument => (126, Error, "missing argument for lexer command {}"),
            UnwantedLexerCommandArgument => {
                (127, Error, "lexer command {} does not take any arguments")
            }
            DuplicatedCommand => (128, Warning, "duplicated command {}"),
            IncompatibleCommands => (129, Warning, "incompatible commands {} and {}"),

            LeftRecursionCycles => (
                130,
                Error,
                "the following sets of rules are mutually left-recursive [{}]",
            ),

            WarningTreatedAsError => (200, Error, "warning treated as error"),
        }
    }

    pub fn code(self) -> u32 {
        self.spec().0
    }

    pub fn severity(self) -> Severity {
        self.spec().1
    }

    pub fn template(self) -> &'static str {
        self.spec().2
    }

    /// Fill the template's `{}` placeholders positionally.
    pub fn render(self, args: &[&str]) -> String {
        let template = self.template();
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        let mut i = 0;
        while let Some(at) = rest.find("{}") {
            out.push_str(&rest[..at]);
            out.push_str(args.get(i).copied().unwrap_or("?"));
            rest = &rest[at + 2..];
            i += 1;
        }
        out.push_str(rest);
        out
    }
}
