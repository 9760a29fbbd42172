use argh::FromArgs;
use kornia_matrix::{LuDecomposition, Matrix, QrDecomposition, Vector};

/// Solve the linear system A * X = B
#[derive(Debug, FromArgs)]
struct Args {
    /// coefficient matrix, rows as vector literals separated by ';', e.g. "{2, 0}; {0, 2}"
    #[argh(option, short = 'a', from_str_fn(parse_matrix))]
    a: Matrix,

    /// right hand side, same format as the coefficient matrix
    #[argh(option, short = 'b', from_str_fn(parse_matrix))]
    b: Matrix,

    /// factorization to use: auto, lu or qr
    #[argh(option, short = 'm', default = "Method::Auto", from_str_fn(parse_method))]
    method: Method,
}

#[derive(Debug, Clone, Copy)]
enum Method {
    Auto,
    Lu,
    Qr,
}

fn parse_method(value: &str) -> Result<Method, String> {
    match value {
        "auto" => Ok(Method::Auto),
        "lu" => Ok(Method::Lu),
        "qr" => Ok(Method::Qr),
        _ => Err(format!("Unsupported method: {value}")),
    }
}

fn parse_matrix(value: &str) -> Result<Matrix, String> {
    let rows = value
        .split(';')
        .map(|row| row.parse::<Vector>().map(|v| v.to_vec()))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())?;
    Matrix::from_rows(&rows).map_err(|e| e.to_string())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    log::info!(
        "solving {}x{} system with {} right hand side(s) using {:?}",
        args.a.rows(),
        args.a.cols(),
        args.b.cols(),
        args.method
    );

    let x = match args.method {
        Method::Auto => args.a.solve(&args.b)?,
        Method::Lu => LuDecomposition::new(&args.a)?.solve(&args.b)?,
        Method::Qr => QrDecomposition::new(&args.a)?.solve(&args.b)?,
    };

    println!("X =\n{x}");

    if args.a.is_square() {
        println!("det(A) = {}", args.a.determinant()?);
    }

    let residual = args.a.multiply(&x)?.subtract_matrix(&args.b);
    println!("||A * X - B||_F = {:e}", residual.norm_frobenius());

    Ok(())
}
