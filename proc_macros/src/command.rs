use heck::ToKebabCase;
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::parse::Parser;
use syn::{Attribute, Expr, ExprLit, FnArg, ItemFn, Lit, LitStr, Meta, Pat, Type, parse_macro_input};

#[derive(Default)]
struct CommandArgs {
    name: Option<LitStr>,
    brief: Option<LitStr>,
}

struct ParamDef {
    ident: syn::Ident,
    ty: Type,
    hint: String,
    default: Option<TokenStream2>,
}

pub fn expand(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut args = CommandArgs::default();
    let parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("name") {
            args.name = Some(meta.value()?.parse()?);
            Ok(())
        } else if meta.path.is_ident("brief") {
            args.brief = Some(meta.value()?.parse()?);
            Ok(())
        } else {
            Err(meta.error("expected `name` or `brief`"))
        }
    });
    parse_macro_input!(attr with parser);

    let input = parse_macro_input!(item as ItemFn);
    match generate(args, input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}

fn generate(args: CommandArgs, mut input: ItemFn) -> syn::Result<TokenStream2> {
    if input.sig.asyncness.is_none() {
        return Err(syn::Error::new_spanned(&input.sig.fn_token, "command functions must be async"));
    }

    let vis = input.vis.clone();
    let fn_name = input.sig.ident.clone();
    let docs: Vec<Attribute> = input
        .attrs
        .iter()
        .filter(|a| a.path().is_ident("doc"))
        .cloned()
        .collect();
    let help = doc_text(&docs);

    let command_name = match &args.name {
        Some(name) => name.value(),
        None => fn_name.unraw().to_string().to_kebab_case(),
    };

    let mut inputs = input.sig.inputs.iter_mut();
    if inputs.next().is_none() {
        return Err(syn::Error::new_spanned(&input.sig, "command functions take the context first"));
    }

    let mut params = Vec::new();
    for arg in inputs {
        let FnArg::Typed(typed) = arg else {
            return Err(syn::Error::new_spanned(arg, "methods are not supported, use Callback::bound"));
        };
        let Pat::Ident(pat) = typed.pat.as_ref() else {
            return Err(syn::Error::new_spanned(&typed.pat, "parameters must be plain identifiers"));
        };

        let ty = typed.ty.as_ref().clone();
        let mut def = ParamDef {
            ident: pat.ident.clone(),
            hint: quote!(#ty).to_string(),
            default: is_option(&ty).then(|| quote!(::discord_compat::serde_json::Value::Null)),
            ty,
        };

        let mut kept = Vec::new();
        for attr in typed.attrs.drain(..) {
            if attr.path().is_ident("default") {
                let expr: Expr = attr.parse_args()?;
                def.default = Some(quote!(::discord_compat::serde_json::json!(#expr)));
            } else if attr.path().is_ident("hint") {
                def.hint = attr.parse_args::<LitStr>()?.value();
            } else {
                kept.push(attr);
            }
        }
        typed.attrs = kept;
        params.push(def);
    }

    let body_ident = format_ident!("__{}_body", fn_name.unraw());
    input.sig.ident = body_ident.clone();
    input.vis = syn::Visibility::Inherited;
    input.attrs.retain(|a| !a.path().is_ident("doc"));

    let help_call = help.map(|h| quote!(.help(#h)));
    let brief_call = args.brief.map(|b| quote!(.brief(#b)));

    let param_calls = params.iter().map(|p| {
        let name = p.ident.unraw().to_string();
        let hint = &p.hint;
        let default = p.default.as_ref().map(|d| quote!(.default(#d)));
        quote!(.param(::discord_compat::Param::new(#name).hint(#hint) #default))
    });

    let bindings = params.iter().map(|p| {
        let ident = &p.ident;
        let ty = &p.ty;
        let name = p.ident.unraw().to_string();
        quote!(let #ident: #ty = __args.get(#name)?;)
    });
    let idents = params.iter().map(|p| &p.ident);

    Ok(quote! {
        #(#docs)*
        #vis fn #fn_name() -> ::discord_compat::CommandBuilder {
            #input

            ::discord_compat::CommandBuilder::new(#command_name)
                #help_call
                #brief_call
                #(#param_calls)*
                .callback(::discord_compat::Callback::new(|__ctx, __args: ::discord_compat::Args| async move {
                    #(#bindings)*
                    #body_ident(__ctx, #(#idents),*)
                        .await
                        .map_err(::discord_compat::HandlerError::from)?;
                    ::std::result::Result::<(), ::discord_compat::HandlerError>::Ok(())
                }))
        }
    })
}

fn is_option(ty: &Type) -> bool {
    match ty {
        Type::Path(path) => path
            .path
            .segments
            .last()
            .is_some_and(|s| s.ident == "Option"),
        _ => false,
    }
}

fn doc_text(attrs: &[Attribute]) -> Option<String> {
    let lines: Vec<String> = attrs
        .iter()
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(ExprLit { lit: Lit::Str(s), .. }) => Some(s.value().trim().to_string()),
                _ => None,
            },
            _ => None,
        })
        .collect();

    let text = lines.join("\n").trim().to_string();
    (!text.is_empty()).then_some(text)
}
