use log::{
	info,
	warn
};

use std::{
	env,
	fs::File,
	io::{
		self,
		BufWriter,
		Write
	},
	path::Path,
	process::ExitCode
};

use thiserror::Error;

use vbmkit_core::scene::Material;

use vbmkit_models_vbm::convert::{
	convert,
	ExportCfg,
	VbmExportError
};

use vbmkit_models_wavefront::{
	mtl::{
		self,
		import::MtlImportError
	},
	obj::{
		self,
		import::ObjImportError
	}
};

#[derive(Error, Debug)]
enum Obj2VbmError {
	#[error("I/O error writing {path}: {source}")]
	IO {
		path: String,
		source: io::Error,
	},
	#[error("Failed to read {path}: {source}")]
	Obj {
		path: String,
		source: ObjImportError,
	},
	#[error("Failed to read {path}: {source}")]
	Mtl {
		path: String,
		source: MtlImportError,
	},
	#[error("Failed to convert model: {0}")]
	Export(#[from] VbmExportError),
}

/// Loads the `mtllib` libraries of an OBJ, relative to the OBJ's directory.
/// Libraries that can't be opened are skipped.
fn load_mtllibs(obj_path: &Path, libs: &[String]) -> Result<Vec<Material>, Obj2VbmError> {
	let dir = obj_path.parent().unwrap_or_else(|| Path::new(""));
	let mut materials: Vec<Material> = vec![];

	for lib in libs.iter() {
		let path = dir.join(mtl::normalize_path(lib));
		match mtl::import::open(&path) {
			Ok(mats) => {
				for mat in mats {
					// A later library may not redefine an earlier material
					if !materials.iter().any(|m| m.name == mat.name) {
						materials.push(mat);
					}
				}
			},
			Err(MtlImportError::IO { source }) => warn!("Skipping material library {}: {}", path.display(), source),
			Err(e) => return Err(Obj2VbmError::Mtl {
				path: path.display().to_string(),
				source: e,
			}),
		}
	}

	Ok(materials)
}

fn run(obj_path: &str, out_path: &str, mtl_path: Option<&str>) -> Result<(), Obj2VbmError> {
	let obj = obj::import::open(obj_path).map_err(|e| Obj2VbmError::Obj {
		path: obj_path.to_string(),
		source: e,
	})?;

	let materials = match mtl_path {
		Some(path) => mtl::import::open(path).map_err(|e| Obj2VbmError::Mtl {
			path: path.to_string(),
			source: e,
		})?,
		None => load_mtllibs(Path::new(obj_path), &obj.mtllibs)?,
	};

	let mesh = obj.into_mesh(materials);
	let model = convert(&mesh, &ExportCfg::default())?;

	let io_err = |e| Obj2VbmError::IO {
		path: out_path.to_string(),
		source: e,
	};
	let mut out = BufWriter::new(File::create(out_path).map_err(io_err)?);
	model.write(&mut out).map_err(io_err)?;
	out.flush().map_err(io_err)?;

	info!("Wrote {}: {} vertices, {} indices, {} materials, {} chunks", out_path,
		model.header.num_vertices, model.header.num_indices, model.header.num_materials, model.chunks.len());

	Ok(())
}

fn main() -> ExitCode {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let args: Vec<String> = env::args().collect();
	if args.len() < 3 {
		eprintln!("Usage: {} <input.obj> <output.vbm> [material.mtl]",
			args.first().map_or("obj2vbm", |s| s.as_str()));
		return ExitCode::FAILURE;
	}

	match run(&args[1], &args[2], args.get(3).map(|s| s.as_str())) {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			eprintln!("obj2vbm: {}", e);
			ExitCode::FAILURE
		},
	}
}

#[cfg(test)]
mod tests {
	use std::{
		fs,
		path::PathBuf
	};

	use vbmkit_models_vbm::vbm::{
		IndexType,
		VbmModel
	};

	use super::*;

	fn scratch_dir(name: &str) -> PathBuf {
		let dir = env::temp_dir().join(format!("obj2vbm-{}-{}", name, std::process::id()));
		fs::create_dir_all(&dir).unwrap();
		dir
	}

	const TRIANGLE: &str = "\
mtllib tri.mtl missing.mtl
v 0 0 0
v 2 0 0
v 0 2 0
usemtl red
f 1 2 3
";

	#[test]
	fn test_mtllib_next_to_obj() {
		let dir = scratch_dir("mtllib");
		fs::write(dir.join("tri.obj"), TRIANGLE).unwrap();
		fs::write(dir.join("tri.mtl"), "newmtl red\nKd 1 0 0\nmap_Kd tex\\red.dds\n").unwrap();
		let out = dir.join("tri.vbm");

		run(dir.join("tri.obj").to_str().unwrap(), out.to_str().unwrap(), None).unwrap();
		let model = VbmModel::open(&out).unwrap();

		assert_eq!(3, model.header.num_vertices);
		assert_eq!(IndexType::U16, model.header.index_type);
		assert_eq!(1, model.materials.len());
		assert_eq!("tex/red.dds", model.materials[0].diffuse_map);
		assert_eq!(0, model.chunks[0].material_index);

		fs::remove_dir_all(&dir).unwrap();
	}

	#[test]
	fn test_explicit_mtl() {
		let dir = scratch_dir("explicit");
		fs::write(dir.join("tri.obj"), TRIANGLE).unwrap();
		fs::write(dir.join("other.mtl"), "newmtl blue\nnewmtl red\n").unwrap();
		let out = dir.join("tri.vbm");

		run(dir.join("tri.obj").to_str().unwrap(), out.to_str().unwrap(),
			Some(dir.join("other.mtl").to_str().unwrap())).unwrap();
		let model = VbmModel::open(&out).unwrap();

		assert_eq!(2, model.materials.len());
		assert_eq!(1, model.chunks[0].material_index);

		fs::remove_dir_all(&dir).unwrap();
	}

	#[test]
	fn test_missing_obj() {
		assert!(matches!(run("no/such/file.obj", "unused.vbm", None), Err(Obj2VbmError::Obj { .. })));
	}
}
