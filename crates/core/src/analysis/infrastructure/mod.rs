pub mod scripted_face_analyzer;
