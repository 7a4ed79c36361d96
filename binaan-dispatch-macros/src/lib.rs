//! Procedural macros for binaan-dispatch

use darling::{FromDeriveInput, FromVariant};
use proc_macro::TokenStream;
use proc_macro2::{Ident, TokenStream as TokenStream2};
use quote::{format_ident, quote};
use std::collections::BTreeMap;
use syn::{parse_macro_input, DeriveInput};

/// Container-level attributes for #[derive(Action)]
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(action), supports(enum_any))]
struct ActionOpts {
    ident: syn::Ident,
    data: darling::ast::Data<ActionVariant, ()>,

    /// Enable automatic category inference from variant name prefixes
    #[darling(default)]
    infer_categories: bool,
}

/// Variant-level attributes
#[derive(Debug, FromVariant)]
#[darling(attributes(action))]
struct ActionVariant {
    ident: syn::Ident,
    fields: darling::ast::Fields<()>,

    /// Explicit category override
    #[darling(default)]
    category: Option<String>,

    /// Exclude from category inference
    #[darling(default)]
    skip_category: bool,

    /// Delegate name/phase to the single wrapped action
    #[darling(default)]
    forward: bool,

    /// Explicit lifecycle phase: "pending", "fulfilled" or "rejected"
    #[darling(default)]
    phase: Option<String>,
}

/// Verbs that end the category prefix of a variant name
///
/// Operation nouns such as `Delete` or `Initialize` are deliberately absent:
/// in `DeleteSubmit` / `DeleteDidComplete` they name the category.
const ACTION_VERBS: &[&str] = &[
    // Async intents
    "Fetch", "Submit", "Load", // Sync updates
    "Set", "Reset", "Clear", "Toggle", "Select", "Expand", "Collapse",
];

/// Last words of a pending (intent) variant
const PENDING_VERBS: &[&str] = &["Fetch", "Submit"];

/// Last words of a rejected result variant
const REJECTED_WORDS: &[&str] = &["Error", "Fail"];

/// Split a PascalCase string into parts
fn split_pascal_case(s: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();

    for ch in s.chars() {
        if ch.is_uppercase() && !current.is_empty() {
            parts.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

/// Convert PascalCase to snake_case
fn to_snake_case(s: &str) -> String {
    split_pascal_case(s)
        .iter()
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Convert snake_case to PascalCase
fn to_pascal_case(s: &str) -> String {
    s.split('_')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            }
        })
        .collect()
}

/// Category from the prefix before the first verb or `Did`
///
/// `ListFetch`, `ListDidLoad` -> `list`; `DetailItemDidError` -> `detail_item`.
/// Names starting with a verb or without one are uncategorized.
fn infer_category(name: &str) -> Option<String> {
    let parts = split_pascal_case(name);
    if parts.len() < 2 || ACTION_VERBS.contains(&parts[0].as_str()) || parts[0] == "Did" {
        return None;
    }

    let prefix_end = parts
        .iter()
        .skip(1)
        .position(|part| part == "Did" || ACTION_VERBS.contains(&part.as_str()))?
        + 1;

    Some(to_snake_case(&parts[..prefix_end].concat()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PhaseKind {
    Pending,
    Fulfilled,
    Rejected,
}

impl PhaseKind {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "fulfilled" => Some(Self::Fulfilled),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    fn tokens(self) -> TokenStream2 {
        match self {
            Self::Pending => quote! { ::binaan_dispatch::Phase::Pending },
            Self::Fulfilled => quote! { ::binaan_dispatch::Phase::Fulfilled },
            Self::Rejected => quote! { ::binaan_dispatch::Phase::Rejected },
        }
    }
}

/// Lifecycle phase implied by a variant name
fn infer_phase(name: &str) -> Option<PhaseKind> {
    let parts = split_pascal_case(name);
    let last = parts.last()?.as_str();

    if parts.iter().any(|p| p == "Did") {
        if REJECTED_WORDS.contains(&last) {
            Some(PhaseKind::Rejected)
        } else {
            Some(PhaseKind::Fulfilled)
        }
    } else if PENDING_VERBS.contains(&last) {
        Some(PhaseKind::Pending)
    } else {
        None
    }
}

/// Match pattern binding nothing
fn wildcard_pattern(enum_name: &Ident, v: &ActionVariant) -> TokenStream2 {
    let variant = &v.ident;
    match v.fields.style {
        darling::ast::Style::Unit => quote! { #enum_name::#variant },
        darling::ast::Style::Tuple => quote! { #enum_name::#variant(..) },
        darling::ast::Style::Struct => quote! { #enum_name::#variant { .. } },
    }
}

/// Derive macro for the Action trait
///
/// Generates `name()` (the variant name) and `phase()`.
///
/// Variant attributes:
/// - `#[action(forward)]` on a single-field tuple variant delegates `name()`
///   and `phase()` to the wrapped action (used to nest feature actions)
/// - `#[action(phase = "pending" | "fulfilled" | "rejected")]` overrides the
///   inferred phase
/// - `#[action(category = "...")]`, `#[action(skip_category)]`
///
/// Phase inference: names ending in `Fetch`/`Submit` are pending; names
/// containing `Did` are fulfilled unless they end in `Error`/`Fail`.
///
/// With `#[action(infer_categories)]`, also generates:
/// - `category() -> Option<&'static str>` and `category_enum()`
/// - `is_{category}()` predicates
/// - `{Name}Category` enum and the `ActionCategory` impl
///
/// # Example
/// ```ignore
/// #[derive(Action, Clone, Debug)]
/// #[action(infer_categories)]
/// enum KurikulumAction {
///     ListFetch(RequestId),                 // category "list", Pending
///     ListDidLoad(RequestId, Page),         // category "list", Fulfilled
///     ListDidError(RequestId, String),      // category "list", Rejected
///     FiltersSet(FilterPatch),              // category "filters"
/// }
///
/// #[derive(Action, Clone, Debug)]
/// enum Action {
///     #[action(forward)]
///     Kurikulum(KurikulumAction),
///     SessionReset,
/// }
///
/// assert_eq!(Action::Kurikulum(KurikulumAction::ListFetch(id)).name(), "ListFetch");
/// ```
#[proc_macro_derive(Action, attributes(action))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let opts = match ActionOpts::from_derive_input(&input) {
        Ok(opts) => opts,
        Err(e) => return e.write_errors().into(),
    };

    let name = &opts.ident;

    let variants = match &opts.data {
        darling::ast::Data::Enum(variants) => variants,
        _ => {
            return syn::Error::new_spanned(&input, "Action can only be derived for enums")
                .to_compile_error()
                .into();
        }
    };

    let mut errors = Vec::new();
    for v in variants {
        if v.forward
            && !(v.fields.style == darling::ast::Style::Tuple && v.fields.fields.len() == 1)
        {
            errors.push(syn::Error::new_spanned(
                &v.ident,
                "#[action(forward)] requires a tuple variant with exactly one field",
            ));
        }
        if let Some(phase) = &v.phase {
            if PhaseKind::parse(phase).is_none() {
                errors.push(syn::Error::new_spanned(
                    &v.ident,
                    format!(
                        "unknown phase `{}`, expected pending, fulfilled or rejected",
                        phase
                    ),
                ));
            }
        }
    }
    if !errors.is_empty() {
        let errors = errors.into_iter().map(|e| e.to_compile_error());
        return quote! { #(#errors)* }.into();
    }

    let name_arms = variants.iter().map(|v| {
        let variant = &v.ident;
        if v.forward {
            quote! { #name::#variant(inner) => ::binaan_dispatch::Action::name(inner) }
        } else {
            let pattern = wildcard_pattern(name, v);
            let variant_str = variant.to_string();
            quote! { #pattern => #variant_str }
        }
    });

    let phase_arms = variants.iter().map(|v| {
        let variant = &v.ident;
        if v.forward && v.phase.is_none() {
            return quote! { #name::#variant(inner) => ::binaan_dispatch::Action::phase(inner) };
        }
        let pattern = wildcard_pattern(name, v);
        let phase = v
            .phase
            .as_deref()
            .and_then(PhaseKind::parse)
            .or_else(|| infer_phase(&variant.to_string()));
        match phase {
            Some(phase) => {
                let phase = phase.tokens();
                quote! { #pattern => ::core::option::Option::Some(#phase) }
            }
            None => quote! { #pattern => ::core::option::Option::None },
        }
    });

    let mut expanded = quote! {
        impl ::binaan_dispatch::Action for #name {
            fn name(&self) -> &'static str {
                match self {
                    #(#name_arms),*
                }
            }

            fn phase(&self) -> ::core::option::Option<::binaan_dispatch::Phase> {
                match self {
                    #(#phase_arms),*
                }
            }
        }
    };

    if opts.infer_categories {
        expanded.extend(derive_categories(name, variants));
    }

    expanded.into()
}

fn derive_categories(name: &Ident, variants: &[ActionVariant]) -> TokenStream2 {
    let variant_categories: Vec<(&ActionVariant, Option<String>)> = variants
        .iter()
        .map(|v| {
            let cat = if v.skip_category {
                None
            } else if let Some(explicit) = &v.category {
                Some(explicit.clone())
            } else if v.forward {
                Some(to_snake_case(&v.ident.to_string()))
            } else {
                infer_category(&v.ident.to_string())
            };
            (v, cat)
        })
        .collect();

    // Sorted for deterministic output
    let mut categories: BTreeMap<String, Vec<TokenStream2>> = BTreeMap::new();
    for (v, cat) in &variant_categories {
        if let Some(cat) = cat {
            categories
                .entry(cat.clone())
                .or_default()
                .push(wildcard_pattern(name, v));
        }
    }

    let category_enum_name = format_ident!("{}Category", name);
    let category_variants: Vec<_> = categories
        .keys()
        .map(|c| format_ident!("{}", to_pascal_case(c)))
        .collect();
    let category_names: Vec<_> = categories.keys().cloned().collect();

    let category_arms = variant_categories.iter().map(|(v, cat)| {
        let pattern = wildcard_pattern(name, v);
        match cat {
            Some(c) => quote! { #pattern => ::core::option::Option::Some(#c) },
            None => quote! { #pattern => ::core::option::Option::None },
        }
    });

    let category_enum_arms = variant_categories.iter().map(|(v, cat)| {
        let pattern = wildcard_pattern(name, v);
        let cat_variant = match cat {
            Some(c) => format_ident!("{}", to_pascal_case(c)),
            None => format_ident!("Uncategorized"),
        };
        quote! { #pattern => #category_enum_name::#cat_variant }
    });

    let predicates = categories.iter().map(|(cat, patterns)| {
        let predicate_name = format_ident!("is_{}", cat);
        let doc = format!(
            "Returns true if this action belongs to the `{}` category.",
            cat
        );
        quote! {
            #[doc = #doc]
            pub fn #predicate_name(&self) -> bool {
                matches!(self, #(#patterns)|*)
            }
        }
    });

    let category_enum_doc = format!(
        "Action categories for [`{}`].\n\n\
         Use [`{}::category_enum()`] to get the category of an action.",
        name, name
    );

    quote! {
        #[doc = #category_enum_doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum #category_enum_name {
            #(#category_variants,)*
            /// Actions that don't belong to any specific category.
            Uncategorized,
        }

        impl #category_enum_name {
            /// Get all category values
            pub fn all() -> &'static [Self] {
                &[#(Self::#category_variants,)* Self::Uncategorized]
            }

            /// Get category name as string
            pub fn name(&self) -> &'static str {
                match self {
                    #(Self::#category_variants => #category_names,)*
                    Self::Uncategorized => "uncategorized",
                }
            }
        }

        impl #name {
            /// Get the action's category (if categorized)
            pub fn category(&self) -> ::core::option::Option<&'static str> {
                match self {
                    #(#category_arms,)*
                }
            }

            /// Get the category as an enum value
            pub fn category_enum(&self) -> #category_enum_name {
                match self {
                    #(#category_enum_arms,)*
                }
            }

            #(#predicates)*
        }

        impl ::binaan_dispatch::ActionCategory for #name {
            type Category = #category_enum_name;

            fn category(&self) -> ::core::option::Option<&'static str> {
                #name::category(self)
            }

            fn category_enum(&self) -> Self::Category {
                #name::category_enum(self)
            }
        }
    }
}
